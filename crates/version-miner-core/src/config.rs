//! Action inputs and their resolution into a run configuration.
//!
//! GitHub Actions hands every input over as a string, and inputs without a
//! value arrive empty. [`ActionInputs`] keeps that raw shape;
//! [`Configuration::from_inputs`] validates it once and resolves the
//! tri-state booleans (`true` / `false` / unset) to plain `bool`s.

use crate::error::ConfigError;

/// Raw action inputs, exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInputs {
    pub repo_owner: String,
    pub repo_name: String,
    pub branch_name: String,
    pub file_path: String,
    pub file_format: String,
    pub version_keys: String,
    pub case_sensitive_keys: Option<String>,
    pub trim_start_from_branch: Option<String>,
    pub fail_on_missing_key: Option<String>,
    pub fail_on_key_value_mismatch: Option<String>,
    pub fail_when_version_not_found: Option<String>,
    pub repo_token: Option<String>,
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub repo_owner: String,
    pub repo_name: String,
    pub branch_name: String,
    /// Path relative to the repository root, without a leading `/`
    pub file_path: String,
    /// Checked by the pipeline, not here, so an unsupported format is
    /// reported as such rather than as a configuration error
    pub file_format: String,
    /// Comma-separated candidate keys, parsed by the pipeline
    pub version_keys: String,
    pub case_sensitive_keys: bool,
    pub trim_start_from_branch: Option<String>,
    pub fail_on_missing_key: bool,
    pub fail_on_key_value_mismatch: bool,
    pub fail_when_version_not_found: bool,
    pub repo_token: Option<String>,
}

impl Configuration {
    /// Validate raw inputs and resolve defaults.
    pub fn from_inputs(inputs: ActionInputs) -> Result<Self, ConfigError> {
        let repo_owner = required("repo-owner", &inputs.repo_owner)?;
        let repo_name = required("repo-name", &inputs.repo_name)?;
        let branch_name = required("branch-name", &inputs.branch_name)?;
        let file_path = relative_file_path(&required("file-path", &inputs.file_path)?)?;
        let file_format = required("file-format", &inputs.file_format)?;

        Ok(Configuration {
            repo_owner,
            repo_name,
            branch_name,
            file_path,
            file_format,
            version_keys: inputs.version_keys,
            case_sensitive_keys: flag("case-sensitive-keys", inputs.case_sensitive_keys)?,
            trim_start_from_branch: optional(inputs.trim_start_from_branch),
            fail_on_missing_key: flag("fail-on-missing-key", inputs.fail_on_missing_key)?,
            fail_on_key_value_mismatch: flag(
                "fail-on-key-value-mismatch",
                inputs.fail_on_key_value_mismatch,
            )?,
            fail_when_version_not_found: flag(
                "fail-when-version-not-found",
                inputs.fail_when_version_not_found,
            )?,
            repo_token: optional(inputs.repo_token),
        })
    }
}

fn required(input: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingInput(input));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve a tri-state boolean input. Unset and empty both mean `false`.
fn flag(input: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        _ => Err(ConfigError::InvalidBoolean {
            input,
            value: raw,
        }),
    }
}

/// `C:/...` or `C:\...`
fn contains_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

fn relative_file_path(path: &str) -> Result<String, ConfigError> {
    if contains_drive(path) {
        return Err(ConfigError::AbsoluteFilePath(path.to_string()));
    }

    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return Err(ConfigError::MissingInput("file-path"));
    }
    Ok(relative.to_string())
}
