use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::InquiryError;

/// Fields captured by the B2B inquiry form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquiryDetails {
    #[serde(deserialize_with = "nullable_text")]
    pub agency_name: String,
    #[serde(deserialize_with = "nullable_text")]
    pub license_number: String,
    #[serde(deserialize_with = "nullable_text")]
    pub name: String,
    #[serde(deserialize_with = "nullable_text")]
    pub email: String,
    #[serde(deserialize_with = "nullable_text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_count")]
    pub pax: Option<u32>,
    #[serde(deserialize_with = "lenient_count")]
    pub adults: Option<u32>,
    #[serde(deserialize_with = "lenient_count")]
    pub children_6_11: Option<u32>,
    #[serde(deserialize_with = "lenient_count")]
    pub infants_under_6: Option<u32>,
    pub travel_dates: Option<String>,
    pub package_slug: Option<String>,
    pub room_category: Option<String>,
    #[serde(deserialize_with = "text_or_list")]
    pub places_of_visit: Option<String>,
    pub estimated_budget: Option<String>,
    pub newsletter_optin: bool,
}

impl InquiryDetails {
    /// Trims the contact fields and checks the ones the team needs to respond.
    pub fn validated(mut self) -> Result<Self, InquiryError> {
        for field in [
            &mut self.agency_name,
            &mut self.license_number,
            &mut self.name,
            &mut self.email,
            &mut self.phone,
        ] {
            *field = field.trim().to_string();
        }

        if self.agency_name.is_empty() {
            return Err(InquiryError::MissingField("agency_name"));
        }
        if self.name.is_empty() {
            return Err(InquiryError::MissingField("name"));
        }
        if self.email.is_empty() {
            return Err(InquiryError::MissingField("email"));
        }
        if !self.email.contains('@') {
            return Err(InquiryError::InvalidEmail(self.email));
        }
        if self.phone.is_empty() {
            return Err(InquiryError::MissingField("phone"));
        }

        self.package_slug = self
            .package_slug
            .take()
            .map(|slug| slug.trim().to_string())
            .filter(|slug| !slug.is_empty());
        Ok(self)
    }
}

/// A persisted inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub motac_verified: bool,
    #[serde(flatten)]
    pub details: InquiryDetails,
}

impl Inquiry {
    /// Short reference quoted to the submitter.
    pub fn reference(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map_or(self.id.len(), |(index, _)| index);
        &self.id[..end]
    }

    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            &self.details.name,
            &self.details.email,
            &self.details.agency_name,
        ]
        .iter()
        .any(|value| value.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Internal,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// One outbound e-mail logged against an inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Communication {
    pub inquiry_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub direction: Direction,
    pub subject: String,
    pub content: String,
    #[serde(rename = "resend_id")]
    pub provider_id: Option<String>,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
        Null,
    }

    match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(value)) => Ok(Some(value)),
        Some(Count::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Count::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid count '{text}'"))),
        Some(Count::Null) | None => Ok(None),
    }
}

fn text_or_list<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Places {
        Text(String),
        List(Vec<String>),
    }

    let joined = match Option::<Places>::deserialize(deserializer)? {
        Some(Places::Text(text)) => text,
        Some(Places::List(list)) => list.join(", "),
        None => return Ok(None),
    };
    let trimmed = joined.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid inquiry id {other}"))),
    }
}
