use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::changelog;
use super::git::VersionControl;
use super::manifest::Manifest;
use super::version::{BumpKind, Version};
use super::ReleaseError;

const SUMMARISED_FILES: usize = 3;

#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub kind: BumpKind,
    pub message: Option<String>,
    pub force: bool,
    pub manifest_path: PathBuf,
    pub changelog_path: PathBuf,
    pub date: NaiveDate,
}

impl ReleaseOptions {
    /// Resolves the command line: `--major` wins over `--minor`, which wins
    /// over a positional kind. The first positional that is not a kind is the
    /// message.
    pub fn from_invocation(
        positional: &[String],
        major: bool,
        minor: bool,
        force: bool,
        manifest_path: PathBuf,
        changelog_path: PathBuf,
        date: NaiveDate,
    ) -> Self {
        let positional_kind = positional.iter().find_map(|arg| BumpKind::parse(arg));
        let kind = if major {
            BumpKind::Major
        } else if minor {
            BumpKind::Minor
        } else {
            positional_kind.unwrap_or_default()
        };
        let message = positional
            .iter()
            .find(|arg| BumpKind::parse(arg).is_none())
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty());

        Self {
            kind,
            message,
            force,
            manifest_path,
            changelog_path,
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub previous: Version,
    pub version: Version,
    pub kind: BumpKind,
    pub message: String,
    /// Set when the files were written but committing or tagging failed.
    pub git_error: Option<String>,
}

impl ReleaseSummary {
    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Nothing changed and no override was given; nothing was written.
    Clean,
    Released(ReleaseSummary),
}

/// `update: modified a, b, c` from the first three basenames, with
/// ` and N others` for the remainder.
pub fn synthesize_message(changed: &[String]) -> String {
    if changed.is_empty() {
        return "update: no file changes".to_string();
    }

    let names: Vec<&str> = changed
        .iter()
        .take(SUMMARISED_FILES)
        .map(|path| basename(path))
        .collect();
    let mut message = format!("update: modified {}", names.join(", "));
    if changed.len() > SUMMARISED_FILES {
        message.push_str(&format!(" and {} others", changed.len() - SUMMARISED_FILES));
    }
    message
}

fn basename(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Bumps the manifest version, records the changelog entry, then commits and
/// tags. Git problems after the files are written are reported in the summary
/// rather than failing the release.
pub fn run_release(
    vcs: &dyn VersionControl,
    options: &ReleaseOptions,
) -> Result<ReleaseOutcome, ReleaseError> {
    let changed = vcs.changed_files().unwrap_or_else(|err| {
        warn!(error = %err, "could not read working tree status");
        Vec::new()
    });

    if changed.is_empty() && !options.force {
        info!("No changes detected. Repository is clean.");
        return Ok(ReleaseOutcome::Clean);
    }

    let message = match &options.message {
        Some(message) => message.clone(),
        None => {
            let message = synthesize_message(&changed);
            info!(%message, "generated release message");
            message
        }
    };

    let mut manifest = Manifest::load(&options.manifest_path)?;
    let previous = manifest.version()?;
    let version = previous.bump(options.kind);
    manifest.set_version(version);
    manifest.save()?;

    changelog::record_release(&options.changelog_path, version, options.date, &message)?;
    info!(%previous, %version, kind = %options.kind, "version bumped");

    let git_error = publish(vcs, version, &message).err().map(|err| {
        warn!(error = %err, "git operations failed");
        err.to_string()
    });

    Ok(ReleaseOutcome::Released(ReleaseSummary {
        previous,
        version,
        kind: options.kind,
        message,
        git_error,
    }))
}

fn publish(vcs: &dyn VersionControl, version: Version, message: &str) -> Result<(), ReleaseError> {
    vcs.stage_all()?;
    vcs.commit(&format!("release: v{version} - {message}"))?;
    vcs.tag(
        &format!("v{version}"),
        &format!("Release v{version}: {message}"),
    )?;
    info!(tag = %format!("v{version}"), "committed and tagged release");
    Ok(())
}
