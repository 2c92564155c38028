//! Error taxonomy for version-miner-core

use thiserror::Error;

/// Errors raised while turning raw action inputs into a [`Configuration`].
///
/// [`Configuration`]: crate::config::Configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input was empty or whitespace only
    #[error("The '{0}' input must not be empty.")]
    MissingInput(&'static str),

    /// A boolean input held something other than `true`/`false`
    #[error("The '{input}' input value of '{value}' is not a valid boolean. Use 'true' or 'false'.")]
    InvalidBoolean { input: &'static str, value: String },

    /// The file path points outside the repository
    #[error("The 'file-path' value of '{0}' must be relative to the root of the repository.")]
    AbsoluteFilePath(String),
}

/// Errors returned by a [`RepoGateway`](crate::gateway::RepoGateway).
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The server answered 404
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// The server answered with a non-success status other than 404
    #[error("Request to '{url}' failed with status code {status}.")]
    RequestFailed { status: u16, url: String },

    /// The configured API base URL cannot carry path segments
    #[error("Invalid GitHub API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The request never produced a response
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Could not decode response from '{url}': {message}")]
    Decode { url: String, message: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Errors produced by a [`KeyValueExtractor`](crate::extractor::KeyValueExtractor).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    /// The document text is not well-formed XML
    #[error("The file content is not valid XML: {0}")]
    Malformed(String),

    /// `value` was asked for an element that does not exist
    #[error("The XML element '{0}' does not exist.")]
    NoSuchElement(String),
}

impl From<roxmltree::Error> for ExtractError {
    fn from(err: roxmltree::Error) -> Self {
        ExtractError::Malformed(err.to_string())
    }
}

/// Errors produced by an [`ActionOutput`](crate::output::ActionOutput) sink.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Output names are used as keys and cannot be blank
    #[error("The output name must not be empty.")]
    EmptyName,

    /// The file named by `GITHUB_OUTPUT` does not exist
    #[error("The GitHub output file '{0}' was not found.")]
    FileNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failures of a version resolution run.
///
/// Each variant is one classified outcome; none of them is recovered
/// inside the pipeline.
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("The 'file-format' value of '{0}' is invalid. The only file format currently supported is XML.")]
    InvalidFileFormat(String),

    #[error("The repository owner '{0}' does not exist.")]
    OwnerNotFound(String),

    #[error("The repository '{0}' does not exist.")]
    RepoNotFound(String),

    #[error("The repository branch '{0}' does not exist.")]
    BranchNotFound(String),

    #[error("The file '{path}' in the repository '{repo}' for the owner '{owner}' was not found.")]
    FileNotFound {
        owner: String,
        repo: String,
        path: String,
    },

    #[error("No version keys supplied for the 'version-keys' input.")]
    NoVersionKeys,

    #[error("The key '{0}' does not exist in the file. This failure only occurs if the 'fail-on-missing-key' action input is set to 'true'.")]
    MissingKey(String),

    #[error("All values must match. Found {values:?}. This failure only occurs if the 'fail-on-key-value-mismatch' action input is set to 'true'.")]
    ValuesMismatch { values: Vec<String> },

    #[error("No version value was found. If you do not want the GitHub action to fail when no version is found, set the 'fail-when-version-not-found' input to a value of 'false'.")]
    NoVersionFound,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl MinerError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            MinerError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// Result type for version-miner-core operations
pub type Result<T> = std::result::Result<T, MinerError>;
