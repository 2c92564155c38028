//! Version Miner Core
//!
//! Pulls a version value out of a file stored in a GitHub repository and
//! publishes it as a GitHub Action output.
//!
//! ## Key Components
//!
//! - `Configuration`: validated action inputs for one run
//! - `VersionKeys`: ordered candidate element names
//! - `XmlExtractor`: element lookup in XML documents
//! - `GitHubGateway`: owner/repo/branch checks and raw file download
//! - `VersionPipeline`: runs the checks and business rules, then sets the
//!   `version` output

pub mod casefold;
pub mod config;
mod error;
pub mod extractor;
pub mod fakes;
pub mod gateway;
pub mod github;
pub mod keys;
pub mod output;
pub mod pipeline;
pub mod telemetry;
pub mod workflow;

pub use config::{ActionInputs, Configuration};
pub use error::{ConfigError, ExtractError, GatewayError, MinerError, OutputError, Result};
pub use extractor::{KeyValueExtractor, XmlExtractor};
pub use gateway::{GatewayResult, RepoGateway};
pub use github::{GitHubConfig, GitHubGateway, DEFAULT_API_URL};
pub use keys::VersionKeys;
pub use output::{ActionOutput, GitHubOutputFile, StdoutOutput, GITHUB_OUTPUT_VAR};
pub use pipeline::{FileFormat, KeyLookup, PipelineResult, VersionPipeline, VERSION_OUTPUT_NAME};
pub use telemetry::init_tracing;
pub use workflow::WorkflowCommand;
