use super::domain::Inquiry;

const HEADER: [&str; 18] = [
    "id",
    "created_at",
    "agency_name",
    "license_number",
    "motac_verified",
    "name",
    "email",
    "phone",
    "pax",
    "adults",
    "children_6_11",
    "infants_under_6",
    "travel_dates",
    "package_slug",
    "room_category",
    "places_of_visit",
    "estimated_budget",
    "newsletter_optin",
];

/// Renders inquiries as CSV with a header row, in the order given.
pub fn inquiries_csv(inquiries: &[Inquiry]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for inquiry in inquiries {
        let details = &inquiry.details;
        writer.write_record([
            inquiry.id.clone(),
            inquiry
                .created_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            details.agency_name.clone(),
            details.license_number.clone(),
            inquiry.motac_verified.to_string(),
            details.name.clone(),
            details.email.clone(),
            details.phone.clone(),
            optional_count(details.pax),
            optional_count(details.adults),
            optional_count(details.children_6_11),
            optional_count(details.infants_under_6),
            details.travel_dates.clone().unwrap_or_default(),
            details.package_slug.clone().unwrap_or_default(),
            details.room_category.clone().unwrap_or_default(),
            details.places_of_visit.clone().unwrap_or_default(),
            details.estimated_budget.clone().unwrap_or_default(),
            details.newsletter_optin.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

fn optional_count(value: Option<u32>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
