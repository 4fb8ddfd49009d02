use std::path::{Path, PathBuf};

use serde_json::Value;

use super::version::Version;
use super::ReleaseError;

/// A JSON package manifest carrying a top-level `version` string. Every other
/// field is written back untouched and in its original order.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Value,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ReleaseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReleaseError::io(path, source))?;
        let document: Value = serde_json::from_str(&raw)
            .map_err(|err| ReleaseError::Manifest(format!("{}: {err}", path.display())))?;
        if !document.is_object() {
            return Err(ReleaseError::Manifest(format!(
                "{}: expected a JSON object",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn version(&self) -> Result<Version, ReleaseError> {
        self.document
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ReleaseError::Manifest(format!("{}: missing \"version\"", self.path.display()))
            })?
            .parse()
    }

    pub fn set_version(&mut self, version: Version) {
        if let Some(fields) = self.document.as_object_mut() {
            fields.insert("version".to_string(), Value::String(version.to_string()));
        }
    }

    /// Pretty-printed with two-space indentation and a trailing newline.
    pub fn save(&self) -> Result<(), ReleaseError> {
        let mut rendered = serde_json::to_string_pretty(&self.document)
            .map_err(|err| ReleaseError::Manifest(err.to_string()))?;
        rendered.push('\n');
        std::fs::write(&self.path, rendered).map_err(|source| ReleaseError::io(&self.path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_update_preserves_other_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("package.json");
        std::fs::write(
            &path,
            "{\"name\":\"feel-japan\",\"version\":\"0.4.9\",\"private\":true,\"scripts\":{\"dev\":\"next dev\"}}",
        )
        .expect("write");

        let mut manifest = Manifest::load(&path).expect("load");
        assert_eq!(manifest.version().expect("version"), Version::new(0, 4, 9));
        manifest.set_version(Version::new(0, 5, 0));
        manifest.save().expect("save");

        let written = std::fs::read_to_string(&path).expect("read");
        assert_eq!(
            written,
            "{\n  \"name\": \"feel-japan\",\n  \"version\": \"0.5.0\",\n  \"private\": true,\n  \"scripts\": {\n    \"dev\": \"next dev\"\n  }\n}\n"
        );
    }

    #[test]
    fn missing_version_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("package.json");
        std::fs::write(&path, "{\"name\":\"x\"}").expect("write");

        let manifest = Manifest::load(&path).expect("load");
        assert!(matches!(manifest.version(), Err(ReleaseError::Manifest(_))));
    }
}
