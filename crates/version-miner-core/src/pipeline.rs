//! Version resolution pipeline.
//!
//! One run walks a fixed sequence of steps and stops at the first failure:
//!
//! 1. validate the file format
//! 2. trim the configured prefix from the branch name
//! 3. verify owner, repository and branch exist, in that order
//! 4. fetch the file
//! 5. parse the candidate version keys
//! 6. look each key up in the file
//! 7. apply the missing-key, mismatch and not-found rules
//! 8. publish the resolved version as the `version` output

use crate::casefold::{eq_ignore_case, strip_prefix_ignore_case};
use crate::config::Configuration;
use crate::error::{GatewayError, MinerError, Result};
use crate::extractor::KeyValueExtractor;
use crate::gateway::RepoGateway;
use crate::keys::VersionKeys;
use crate::output::ActionOutput;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the action output that receives the version
pub const VERSION_OUTPUT_NAME: &str = "version";

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xml,
}

impl FromStr for FileFormat {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self> {
        if eq_ignore_case(s.trim(), "xml") {
            Ok(FileFormat::Xml)
        } else {
            Err(MinerError::InvalidFileFormat(s.to_string()))
        }
    }
}

/// Outcome of looking up one candidate key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLookup {
    pub key: String,
    pub exists: bool,
    /// Empty when the key does not exist
    pub value: String,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    /// Resolved version; empty when no key held a value
    pub version: String,

    /// Branch name after prefix trimming
    pub branch: String,

    /// One entry per candidate key, in candidate order
    pub lookups: Vec<KeyLookup>,
}

/// Branch name with `prefix` removed once, when it starts with it.
pub fn resolve_branch(branch: &str, prefix: Option<&str>) -> String {
    prefix
        .and_then(|prefix| strip_prefix_ignore_case(branch, prefix))
        .unwrap_or(branch)
        .to_string()
}

/// First candidate key that was not found, if any.
pub fn first_missing_key(lookups: &[KeyLookup]) -> Option<&str> {
    lookups
        .iter()
        .find(|lookup| !lookup.exists)
        .map(|lookup| lookup.key.as_str())
}

/// Whether every recorded value equals the first one. Empty values count.
pub fn values_match(values: &[&str]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}

/// First non-empty value in candidate order, or an empty string.
pub fn select_version(values: &[&str]) -> String {
    values
        .iter()
        .find(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Resolves a version from a repository file and publishes it.
pub struct VersionPipeline {
    gateway: Arc<dyn RepoGateway>,
    extractor: Arc<dyn KeyValueExtractor>,
    output: Arc<dyn ActionOutput>,
}

impl VersionPipeline {
    pub fn new(
        gateway: Arc<dyn RepoGateway>,
        extractor: Arc<dyn KeyValueExtractor>,
        output: Arc<dyn ActionOutput>,
    ) -> Self {
        VersionPipeline {
            gateway,
            extractor,
            output,
        }
    }

    /// Execute one run.
    ///
    /// The output is only written once every rule has passed; a failed run
    /// leaves the output sink untouched.
    pub async fn run(&self, config: &Configuration) -> Result<PipelineResult> {
        let format: FileFormat = config.file_format.parse()?;
        debug!(format = ?format, "File format validated");

        let branch = resolve_branch(
            &config.branch_name,
            config.trim_start_from_branch.as_deref(),
        );
        if branch != config.branch_name {
            info!("Branch Before Trimming: {}", config.branch_name);
            info!(
                "The text '{}' has been trimmed from the branch name.",
                config.trim_start_from_branch.as_deref().unwrap_or_default()
            );
            info!("Branch After Trimming: {}", branch);
        }

        self.verify_existence(config, &branch).await?;

        info!("Getting data for file '{}' . . .", config.file_path);
        let document = self.fetch_file(config, &branch).await?;
        info!("data retrieved");

        info!("Validating version keys . . .");
        let keys = VersionKeys::parse(&config.version_keys);
        if keys.is_empty() {
            return Err(MinerError::NoVersionKeys);
        }
        info!("version keys validated.");

        info!("Pulling version from file . . .");
        let lookups = self.lookup_keys(&document, &keys, config.case_sensitive_keys)?;
        info!("version pulled from file.");

        if config.fail_on_missing_key {
            if let Some(key) = first_missing_key(&lookups) {
                return Err(MinerError::MissingKey(key.to_string()));
            }
        }

        let values: Vec<&str> = lookups.iter().map(|l| l.value.as_str()).collect();

        if config.fail_on_key_value_mismatch && !values_match(&values) {
            return Err(MinerError::ValuesMismatch {
                values: values.iter().map(|v| v.to_string()).collect(),
            });
        }

        let version = select_version(&values);

        if config.fail_when_version_not_found && version.is_empty() {
            return Err(MinerError::NoVersionFound);
        }

        self.output.set_output(VERSION_OUTPUT_NAME, &version).await?;
        info!(version = %version, "Version resolved");

        Ok(PipelineResult {
            version,
            branch,
            lookups,
        })
    }

    async fn verify_existence(&self, config: &Configuration, branch: &str) -> Result<()> {
        let owner = &config.repo_owner;
        let repo = &config.repo_name;

        info!("Verifying if the repository owner '{}' exists . . .", owner);
        if !self.gateway.owner_exists(owner).await? {
            return Err(MinerError::OwnerNotFound(owner.clone()));
        }
        info!("the owner exists.");

        info!("Verifying if the repository '{}' exists . . .", repo);
        if !self.gateway.repo_exists(owner, repo).await? {
            return Err(MinerError::RepoNotFound(repo.clone()));
        }
        info!("the repository exists.");

        info!("Verifying if the repository branch '{}' exists . . .", branch);
        // Trimming can consume the whole name; an empty branch is never looked up.
        if branch.trim().is_empty() {
            return Err(MinerError::BranchNotFound(branch.to_string()));
        }
        if !self.gateway.branch_exists(owner, repo, branch).await? {
            return Err(MinerError::BranchNotFound(branch.to_string()));
        }
        info!("the branch exists.");

        Ok(())
    }

    async fn fetch_file(&self, config: &Configuration, branch: &str) -> Result<String> {
        self.gateway
            .file_content(&config.repo_owner, &config.repo_name, branch, &config.file_path)
            .await
            .map_err(|err| match err {
                GatewayError::NotFound { .. } => MinerError::FileNotFound {
                    owner: config.repo_owner.clone(),
                    repo: config.repo_name.clone(),
                    path: config.file_path.clone(),
                },
                other => other.into(),
            })
    }

    fn lookup_keys(
        &self,
        document: &str,
        keys: &VersionKeys,
        case_sensitive: bool,
    ) -> Result<Vec<KeyLookup>> {
        let mut lookups = Vec::with_capacity(keys.len());

        for key in keys {
            let exists = self.extractor.exists(document, key, case_sensitive)?;
            let value = if exists {
                self.extractor.value(document, key, case_sensitive)?
            } else {
                String::new()
            };
            debug!(key = %key, exists, value = %value, "Key looked up");

            lookups.push(KeyLookup {
                key: key.clone(),
                exists,
                value,
            });
        }

        Ok(lookups)
    }
}
