use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use super::ReleaseError;

/// The repository operations a release needs.
pub trait VersionControl {
    /// Paths with uncommitted changes, as reported by the working tree status.
    fn changed_files(&self) -> Result<Vec<String>, ReleaseError>;
    fn stage_all(&self) -> Result<(), ReleaseError>;
    fn commit(&self, message: &str) -> Result<(), ReleaseError>;
    fn tag(&self, name: &str, message: &str) -> Result<(), ReleaseError>;
}

/// Drives the `git` executable in a working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, ReleaseError> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|err| ReleaseError::Git(format!("failed to run git: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ReleaseError::Git(format!("git {}: {stderr}", args.join(" "))));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControl for GitCli {
    fn changed_files(&self) -> Result<Vec<String>, ReleaseError> {
        let status = self.run(&["status", "--porcelain"])?;
        Ok(parse_porcelain(&status))
    }

    fn stage_all(&self) -> Result<(), ReleaseError> {
        self.run(&["add", "."]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<(), ReleaseError> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    fn tag(&self, name: &str, message: &str) -> Result<(), ReleaseError> {
        self.run(&["tag", "-a", name, "-m", message]).map(|_| ())
    }
}

/// Paths from `git status --porcelain` output; renames report the new path.
pub fn parse_porcelain(status: &str) -> Vec<String> {
    status
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.get(3..))
        .map(|path| {
            let path = path.rsplit(" -> ").next().unwrap_or(path);
            path.trim_matches('"').to_string()
        })
        .collect()
}
