//! Action output sinks.
//!
//! GitHub Actions collects step outputs from the file named by the
//! `GITHUB_OUTPUT` environment variable. Single-line values are written as
//! `name=value`; values containing a line break use the heredoc form
//! `name<<DELIMITER` ... `DELIMITER`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::OutputError;

/// Environment variable naming the output file
pub const GITHUB_OUTPUT_VAR: &str = "GITHUB_OUTPUT";

/// Destination for action outputs.
#[async_trait]
pub trait ActionOutput: Send + Sync {
    async fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError>;
}

/// Render one output entry in the `GITHUB_OUTPUT` file format.
pub fn format_output(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        let delimiter = loop {
            let candidate = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
            if !value.contains(&candidate) {
                break candidate;
            }
        };
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    }
}

/// Appends outputs to the GitHub Actions output file.
#[derive(Debug, Clone)]
pub struct GitHubOutputFile {
    path: PathBuf,
}

impl GitHubOutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GitHubOutputFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActionOutput for GitHubOutputFile {
    async fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError> {
        if name.trim().is_empty() {
            return Err(OutputError::EmptyName);
        }

        // The runner creates the file; a missing one means a misconfigured path.
        if !tokio::fs::try_exists(&self.path).await? {
            return Err(OutputError::FileNotFound(
                self.path.to_string_lossy().to_string(),
            ));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format_output(name, value).as_bytes()).await?;
        file.flush().await?;

        debug!(output = %name, path = ?self.path, "Output written");
        Ok(())
    }
}

/// Prints outputs to stdout; used when no output file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutOutput;

#[async_trait]
impl ActionOutput for StdoutOutput {
    async fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError> {
        if name.trim().is_empty() {
            return Err(OutputError::EmptyName);
        }
        print!("{}", format_output(name, value));
        Ok(())
    }
}
