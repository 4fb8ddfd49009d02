use chrono::NaiveDate;
use feel_japan::maintenance::{
    run_release, BumpKind, ReleaseError, ReleaseOptions, ReleaseOutcome, Version,
    VersionControl,
};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Default)]
struct FakeRepo {
    changed: Vec<String>,
    fail_commit: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeRepo {
    fn with_changes(paths: &[&str]) -> Self {
        Self {
            changed: paths.iter().map(|path| path.to_string()).collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

impl VersionControl for FakeRepo {
    fn changed_files(&self) -> Result<Vec<String>, ReleaseError> {
        Ok(self.changed.clone())
    }

    fn stage_all(&self) -> Result<(), ReleaseError> {
        self.record("add".to_string());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), ReleaseError> {
        if self.fail_commit {
            return Err(ReleaseError::Git("git commit: nothing to commit".to_string()));
        }
        self.record(format!("commit {message}"));
        Ok(())
    }

    fn tag(&self, name: &str, message: &str) -> Result<(), ReleaseError> {
        self.record(format!("tag {name} {message}"));
        Ok(())
    }
}

fn workspace(version: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("package.json"),
        format!("{{\n  \"name\": \"feel-japan-portal\",\n  \"version\": \"{version}\",\n  \"private\": true\n}}\n"),
    )
    .expect("write manifest");
    dir
}

fn options(dir: &Path, positional: &[&str], force: bool) -> ReleaseOptions {
    let positional: Vec<String> = positional.iter().map(|arg| arg.to_string()).collect();
    ReleaseOptions::from_invocation(
        &positional,
        false,
        false,
        force,
        dir.join("package.json"),
        dir.join("CHANGELOG.md"),
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid release date"),
    )
}

fn manifest_version(dir: &Path) -> String {
    let raw = std::fs::read_to_string(dir.join("package.json")).expect("read manifest");
    let document: serde_json::Value = serde_json::from_str(&raw).expect("manifest json");
    document["version"].as_str().expect("version string").to_string()
}

#[test]
fn clean_tree_without_force_writes_nothing() {
    let dir = workspace("1.4.2");
    let repo = FakeRepo::default();

    let outcome = run_release(&repo, &options(dir.path(), &[], false)).expect("release runs");

    assert_eq!(outcome, ReleaseOutcome::Clean);
    assert_eq!(manifest_version(dir.path()), "1.4.2");
    assert!(!dir.path().join("CHANGELOG.md").exists());
    assert!(repo.calls().is_empty());
}

#[test]
fn changed_tree_bumps_patch_and_records_synthesized_message() {
    let dir = workspace("1.4.2");
    let repo = FakeRepo::with_changes(&[
        "app/brochures/page.tsx",
        "lib/brochureService.ts",
        "app/api/inquire/route.ts",
        "README.md",
    ]);

    let outcome = run_release(&repo, &options(dir.path(), &[], false)).expect("release runs");
    let ReleaseOutcome::Released(summary) = outcome else {
        panic!("expected a release");
    };

    assert_eq!(summary.previous, Version::new(1, 4, 2));
    assert_eq!(summary.version, Version::new(1, 4, 3));
    assert_eq!(summary.kind, BumpKind::Patch);
    assert_eq!(
        summary.message,
        "update: modified page.tsx, brochureService.ts, route.ts and 1 others"
    );
    assert_eq!(summary.git_error, None);
    assert_eq!(manifest_version(dir.path()), "1.4.3");

    let manifest = std::fs::read_to_string(dir.path().join("package.json")).expect("manifest");
    let name_at = manifest.find("\"name\"").expect("name kept");
    let version_at = manifest.find("\"version\"").expect("version kept");
    let private_at = manifest.find("\"private\"").expect("private kept");
    assert!(name_at < version_at && version_at < private_at);

    let changelog = std::fs::read_to_string(dir.path().join("CHANGELOG.md")).expect("changelog");
    assert!(changelog.starts_with("# Changelog\n\n## [1.4.3] - 2026-10-19\n### Changed\n"));

    assert_eq!(
        repo.calls(),
        vec![
            "add".to_string(),
            "commit release: v1.4.3 - update: modified page.tsx, brochureService.ts, route.ts and 1 others".to_string(),
            "tag v1.4.3 Release v1.4.3: update: modified page.tsx, brochureService.ts, route.ts and 1 others".to_string(),
        ]
    );
}

#[test]
fn forced_minor_release_uses_given_message() {
    let dir = workspace("0.9.7");
    let repo = FakeRepo::default();

    let outcome = run_release(&repo, &options(dir.path(), &["minor", "Autumn campaign catalog"], true))
        .expect("release runs");
    let ReleaseOutcome::Released(summary) = outcome else {
        panic!("expected a forced release");
    };

    assert_eq!(summary.version, Version::new(0, 10, 0));
    assert_eq!(summary.message, "Autumn campaign catalog");
    assert_eq!(summary.tag(), "v0.10.0");

    let changelog = std::fs::read_to_string(dir.path().join("CHANGELOG.md")).expect("changelog");
    assert!(changelog.contains("## [0.10.0] - 2026-10-19\n### Changed\n- Autumn campaign catalog\n"));
    assert!(changelog.contains("All notable changes to this project will be documented in this file."));
}

#[test]
fn git_failure_keeps_written_files_and_reports_error() {
    let dir = workspace("2.0.0");
    let repo = FakeRepo {
        changed: vec!["package.json".to_string()],
        fail_commit: true,
        ..FakeRepo::default()
    };

    let outcome = run_release(&repo, &options(dir.path(), &["major"], false)).expect("release runs");
    let ReleaseOutcome::Released(summary) = outcome else {
        panic!("expected a release");
    };

    assert_eq!(summary.version, Version::new(3, 0, 0));
    assert_eq!(
        summary.git_error.as_deref(),
        Some("git commit: nothing to commit")
    );
    assert_eq!(manifest_version(dir.path()), "3.0.0");
    assert!(dir.path().join("CHANGELOG.md").exists());
    assert_eq!(repo.calls(), vec!["add".to_string()]);
}

#[test]
fn missing_manifest_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = FakeRepo::with_changes(&["src/main.rs"]);

    let err = run_release(&repo, &options(dir.path(), &[], false)).expect_err("no manifest");
    assert!(matches!(err, ReleaseError::Io { .. }));
}
