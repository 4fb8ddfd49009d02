use std::path::Path;

use chrono::NaiveDate;

use super::version::Version;
use super::ReleaseError;

pub const HEADING: &str = "# Changelog\n";
pub const PREAMBLE: &str =
    "# Changelog\n\nAll notable changes to this project will be documented in this file.\n";

pub fn entry(version: Version, date: NaiveDate, message: &str) -> String {
    format!(
        "\n## [{version}] - {}\n### Changed\n- {message}\n",
        date.format("%Y-%m-%d")
    )
}

/// Places `entry` directly under the heading so the newest release is listed
/// first. A document without the heading gets one.
pub fn insert_entry(document: &str, entry: &str) -> String {
    match document.find(HEADING) {
        Some(index) => {
            let split = index + HEADING.len();
            format!("{}{}{}", &document[..split], entry, &document[split..])
        }
        None => format!("{HEADING}{entry}{document}"),
    }
}

/// Adds a release entry to the changelog at `path`, creating the file first
/// when it does not exist.
pub fn record_release(
    path: &Path,
    version: Version,
    date: NaiveDate,
    message: &str,
) -> Result<(), ReleaseError> {
    let current = match std::fs::read_to_string(path) {
        Ok(current) => current,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => PREAMBLE.to_string(),
        Err(source) => return Err(ReleaseError::io(path, source)),
    };

    let updated = insert_entry(&current, &entry(version, date, message));
    std::fs::write(path, updated).map_err(|source| ReleaseError::io(path, source))
}
