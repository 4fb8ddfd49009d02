use super::CaptureError;

const BROCHURE_PREFIX: &str = "/brochures/";

/// Turns a brochure path or slug into the stored slug format:
/// `/brochures/FITOSKSUMMER26.html` becomes `FITOSKSUMMER26.html`. The prefix
/// and then a single leading `/` are removed once each.
pub fn normalize_slug(raw: &str) -> String {
    let slug = raw.strip_prefix(BROCHURE_PREFIX).unwrap_or(raw);
    slug.strip_prefix('/').unwrap_or(slug).to_string()
}

/// Normalizes and validates a trigger slug. Slugs double as file name stems so
/// only URL/file-safe characters pass.
pub fn parse_trigger_slug(raw: Option<&str>) -> Result<String, CaptureError> {
    let slug = raw.map(normalize_slug).unwrap_or_default();
    if slug.trim().is_empty() {
        return Err(CaptureError::MissingSlug);
    }

    let safe = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if !safe || slug.split('/').any(|segment| segment == "..") {
        return Err(CaptureError::InvalidSlug(slug));
    }

    Ok(slug)
}
