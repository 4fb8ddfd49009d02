use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A marketed travel package, keyed by its slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brochure {
    pub id: String,
    pub slug: String,
    pub image: String,
    pub category: BrochureCategory,
    pub city: Vec<String>,
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tags: BrochureTags,
    pub highlights: Vec<String>,
    pub itinerary: Vec<ItineraryDay>,
    pub pricing: Pricing,
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    #[serde(rename = "paymentTerms")]
    pub payment_terms: PaymentTerms,
    pub created_at: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub campaign_start: Option<NaiveDate>,
    pub campaign_end: Option<NaiveDate>,
    pub show_pricing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_last_generated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Brochure {
    /// Visible in the public catalog on `today`.
    pub fn is_listed(&self, today: NaiveDate) -> bool {
        !self.is_archived && self.campaign_end.map_or(true, |end| end >= today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BrochureCategory {
    Fit,
    Git,
    Corporate,
    Seasonal,
    Other(String),
}

impl BrochureCategory {
    pub fn label(&self) -> &str {
        match self {
            BrochureCategory::Fit => "FIT",
            BrochureCategory::Git => "GIT",
            BrochureCategory::Corporate => "Corporate",
            BrochureCategory::Seasonal => "Seasonal",
            BrochureCategory::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for BrochureCategory {
    fn from(value: String) -> Self {
        match value.trim() {
            "FIT" => Self::Fit,
            "GIT" => Self::Git,
            "Corporate" => Self::Corporate,
            "Seasonal" => Self::Seasonal,
            _ => Self::Other(value),
        }
    }
}

impl From<BrochureCategory> for String {
    fn from(value: BrochureCategory) -> Self {
        value.label().to_string()
    }
}

impl Default for BrochureCategory {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrochureTags {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub pax: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u16,
    pub title: String,
    #[serde(default)]
    pub meals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub pax: String,
    pub adult_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_price_with_bed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_price_no_bed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
    #[serde(default)]
    pub surcharge_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    #[serde(default)]
    pub deposit: String,
    #[serde(default)]
    pub final_payment: String,
}

/// Accepts either `"Osaka"` or `["Osaka", "Kyoto"]`.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(city)) if city.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(city)) => vec![city],
        Some(OneOrMany::Many(cities)) => cities,
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_known_and_unknown_labels() {
        assert_eq!(BrochureCategory::from("GIT".to_string()), BrochureCategory::Git);
        let custom = BrochureCategory::from("Honeymoon".to_string());
        assert_eq!(custom.label(), "Honeymoon");
        assert_eq!(String::from(BrochureCategory::Fit), "FIT");
    }

    #[test]
    fn pricing_uses_camel_case_fields() {
        let pricing: Pricing = serde_json::from_value(serde_json::json!({
            "title": "Per person (MYR)",
            "tiers": [{ "pax": "2-3", "adultPrice": 8990.0, "childPriceNoBed": 6500.0 }],
            "surchargeNote": "Peak season surcharge applies"
        }))
        .expect("pricing parses");

        assert_eq!(pricing.tiers[0].adult_price, 8990.0);
        assert_eq!(pricing.tiers[0].child_price_no_bed, Some(6500.0));
        assert!(pricing.tiers[0].child_price_with_bed.is_none());
    }
}
