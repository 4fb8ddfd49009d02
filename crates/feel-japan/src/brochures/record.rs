use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::domain::{
    one_or_many, Brochure, BrochureCategory, BrochureTags, ItineraryDay, PaymentTerms, Pricing,
};

/// Brochure row as stored in the `brochures` collection. JSON columns are kept
/// raw so one malformed column degrades to its default instead of dropping the
/// whole record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrochureRow {
    #[serde(default)]
    pub id: Value,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub city: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub highlights: Value,
    #[serde(default)]
    pub itinerary: Value,
    #[serde(default)]
    pub pricing: Value,
    #[serde(default)]
    pub inclusions: Value,
    #[serde(default)]
    pub exclusions: Value,
    #[serde(default)]
    pub payment_terms: Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub campaign_start: Option<String>,
    #[serde(default)]
    pub campaign_end: Option<String>,
    #[serde(default)]
    pub show_pricing: Option<bool>,
    #[serde(default)]
    pub pdf_last_generated_at: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl BrochureRow {
    /// Same predicate the PostgREST query applies: not archived, campaign not
    /// yet ended.
    pub fn is_listed(&self, today: NaiveDate) -> bool {
        let archived = self.is_archived.unwrap_or(false);
        let ended = self
            .campaign_end
            .as_deref()
            .and_then(parse_date)
            .map_or(false, |end| end < today);
        !archived && !ended
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

impl From<BrochureRow> for Brochure {
    fn from(row: BrochureRow) -> Self {
        let created_at = row.created_at();
        let slug = row.slug;

        Brochure {
            id: id_to_string(&row.id),
            image: row.image.unwrap_or_default(),
            category: row
                .category
                .map(BrochureCategory::from)
                .unwrap_or_default(),
            city: row.city,
            title: row.title.unwrap_or_default(),
            subtitle: row.subtitle.unwrap_or_default(),
            summary: row.summary.filter(|text| !text.trim().is_empty()),
            tags: json_or_default::<BrochureTags>(&slug, "tags", row.tags),
            highlights: json_or_default::<Vec<String>>(&slug, "highlights", row.highlights),
            itinerary: json_or_default::<Vec<ItineraryDay>>(&slug, "itinerary", row.itinerary),
            pricing: json_or_default::<Pricing>(&slug, "pricing", row.pricing),
            inclusions: json_or_default::<Vec<String>>(&slug, "inclusions", row.inclusions),
            exclusions: json_or_default::<Vec<String>>(&slug, "exclusions", row.exclusions),
            payment_terms: json_or_default::<PaymentTerms>(
                &slug,
                "payment_terms",
                row.payment_terms,
            ),
            created_at,
            is_archived: row.is_archived.unwrap_or(false),
            campaign_start: row.campaign_start.as_deref().and_then(parse_date),
            campaign_end: row.campaign_end.as_deref().and_then(parse_date),
            show_pricing: row.show_pricing.unwrap_or(false),
            pdf_last_generated_at: row
                .pdf_last_generated_at
                .as_deref()
                .and_then(parse_timestamp),
            thumbnail_url: row.thumbnail_url,
            slug,
        }
    }
}

fn json_or_default<T>(slug: &str, column: &'static str, value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return T::default();
    }

    match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(%slug, column, error = %err, "malformed brochure column, using default");
            T::default()
        }
    }
}

fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(raw) => raw.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Dates arrive either as `YYYY-MM-DD` or as full timestamps.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed.get(..10).unwrap_or(trimmed), "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // PostgREST renders timestamptz with a space separator and short offset.
    DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
