use std::fmt::Write as _;

use super::domain::Inquiry;

const MOTAC_LOOKUP_URL: &str =
    "https://www.motac.gov.my/en/kategori-semakan-new/travel-agency-tobtab/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Lead notification for the support inbox.
pub fn internal_notification(inquiry: &Inquiry) -> EmailContent {
    let details = &inquiry.details;
    let subject = format!("New B2B Inquiry: {} - {}", details.agency_name, details.name);

    let mut html = String::new();
    html.push_str("<div style=\"font-family: serif; color: #001F3F; max-width: 600px; margin: 0 auto;\">");
    html.push_str("<h1 style=\"color: #C5A059;\">New Inquiry Received</h1>");
    html.push_str("<p>A new lead has been captured via the Feel Japan with K Portal.</p>");

    field(&mut html, "Agency", &details.agency_name);
    field(&mut html, "License No", &details.license_number);
    writeln!(
        html,
        "<p><strong>License status:</strong> Unverified. <a href=\"{}\">Verify on MOTAC Portal</a></p>",
        MOTAC_LOOKUP_URL
    )
    .expect("license paragraph");
    field(&mut html, "Contact", &details.name);
    field(&mut html, "Email", &details.email);
    field(&mut html, "Phone", &details.phone);

    html.push_str("<h3>Itinerary Interest</h3>");
    field(
        &mut html,
        "Package",
        details.package_slug.as_deref().unwrap_or("Custom Architecture"),
    );
    field(&mut html, "Dates", details.travel_dates.as_deref().unwrap_or("-"));
    writeln!(
        html,
        "<p><strong>Pax:</strong> {} (Adults: {}, Children: {}, Infants: {})</p>",
        count(details.pax),
        count(details.adults),
        count(details.children_6_11),
        count(details.infants_under_6)
    )
    .expect("pax paragraph");
    field(&mut html, "Category", details.room_category.as_deref().unwrap_or("-"));
    field(&mut html, "Budget", details.estimated_budget.as_deref().unwrap_or("-"));
    field(
        &mut html,
        "Destinations",
        details.places_of_visit.as_deref().unwrap_or("-"),
    );
    html.push_str("</div>");

    EmailContent { subject, html }
}

/// Auto-reply confirming receipt to the submitting agent.
pub fn acknowledgement(inquiry: &Inquiry) -> EmailContent {
    let details = &inquiry.details;
    let subject = format!(
        "Inquiry Confirmed: Feel Japan with K Bespoke (Ref: {})",
        inquiry.reference()
    );

    let mut html = String::new();
    html.push_str("<div style=\"font-family: serif; color: #001F3F; max-width: 600px; margin: 0 auto; line-height: 1.6;\">");
    html.push_str("<h2 style=\"color: #C5A059; font-style: italic;\">Feel Japan with K</h2>");
    writeln!(html, "<p>Dear {},</p>", escape_html(&details.name)).expect("greeting");
    writeln!(
        html,
        "<p>We acknowledge receipt of your travel request for <strong>{}</strong>. \
         A member of our team will reach out to you within 24-48 business hours.</p>",
        escape_html(&details.agency_name)
    )
    .expect("acknowledgement paragraph");
    field(&mut html, "Reference ID", &inquiry.id);
    field(
        &mut html,
        "Package Interest",
        details.package_slug.as_deref().unwrap_or("Bespoke Arrangement"),
    );
    html.push_str("<p>Warm regards,<br/><strong>The Feel Japan with K Concierge Team</strong></p>");
    html.push_str("</div>");

    EmailContent { subject, html }
}

fn field(html: &mut String, label: &str, value: &str) {
    writeln!(html, "<p><strong>{}:</strong> {}</p>", label, escape_html(value))
        .expect("field paragraph");
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
