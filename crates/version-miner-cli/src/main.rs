//! Version Miner - GitHub Action entry point
//!
//! The `version-miner` binary pulls a version value out of a file in a GitHub
//! repository and sets it as the `version` action output.
//!
//! Every action input is read from its `INPUT_*` environment variable, the
//! way the Actions runner passes them, and can be overridden with a flag for
//! local runs.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, Level};

use version_miner_core::{
    init_tracing, ActionInputs, ActionOutput, Configuration, GitHubConfig, GitHubGateway,
    GitHubOutputFile, MinerError, PipelineResult, StdoutOutput, VersionPipeline,
    WorkflowCommand, XmlExtractor, DEFAULT_API_URL,
};

const WELCOME: &str = "Welcome To The VersionMiner GitHub Action!!";
const OUTPUT_GROUP: &str = "Version Miner Outputs";

#[derive(Parser, Debug)]
#[command(name = "version-miner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pull a version out of a repository file and set it as an action output", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Owner of the repository
    #[arg(long, env = "INPUT_REPO-OWNER", default_value = "")]
    repo_owner: String,

    /// Name of the repository
    #[arg(long, env = "INPUT_REPO-NAME", default_value = "")]
    repo_name: String,

    /// Branch holding the file
    #[arg(long, env = "INPUT_BRANCH-NAME", default_value = "")]
    branch_name: String,

    /// Path of the file, relative to the repository root
    #[arg(long, env = "INPUT_FILE-PATH", default_value = "")]
    file_path: String,

    /// Format of the file (only `xml` is supported)
    #[arg(long, env = "INPUT_FILE-FORMAT", default_value = "")]
    file_format: String,

    /// Comma-separated element names to look up, in priority order
    #[arg(long, env = "INPUT_VERSION-KEYS", default_value = "")]
    version_keys: String,

    /// Match element names case-sensitively (`true`/`false`)
    #[arg(long, env = "INPUT_CASE-SENSITIVE-KEYS")]
    case_sensitive_keys: Option<String>,

    /// Text to remove from the start of the branch name
    #[arg(long, env = "INPUT_TRIM-START-FROM-BRANCH")]
    trim_start_from_branch: Option<String>,

    /// Fail when any version key is absent (`true`/`false`)
    #[arg(long, env = "INPUT_FAIL-ON-MISSING-KEY")]
    fail_on_missing_key: Option<String>,

    /// Fail when the version keys hold different values (`true`/`false`)
    #[arg(long, env = "INPUT_FAIL-ON-KEY-VALUE-MISMATCH")]
    fail_on_key_value_mismatch: Option<String>,

    /// Fail when no version value is found (`true`/`false`)
    #[arg(long, env = "INPUT_FAIL-WHEN-VERSION-NOT-FOUND")]
    fail_when_version_not_found: Option<String>,

    /// Token for private repositories and higher rate limits
    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    repo_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// File that receives action outputs (stdout when unset)
    #[arg(long, env = "GITHUB_OUTPUT")]
    github_output: Option<String>,
}

impl Cli {
    fn inputs(&self) -> ActionInputs {
        ActionInputs {
            repo_owner: self.repo_owner.clone(),
            repo_name: self.repo_name.clone(),
            branch_name: self.branch_name.clone(),
            file_path: self.file_path.clone(),
            file_format: self.file_format.clone(),
            version_keys: self.version_keys.clone(),
            case_sensitive_keys: self.case_sensitive_keys.clone(),
            trim_start_from_branch: self.trim_start_from_branch.clone(),
            fail_on_missing_key: self.fail_on_missing_key.clone(),
            fail_on_key_value_mismatch: self.fail_on_key_value_mismatch.clone(),
            fail_when_version_not_found: self.fail_when_version_not_found.clone(),
            repo_token: self.repo_token.clone(),
        }
    }

    fn output_sink(&self) -> Arc<dyn ActionOutput> {
        match self.github_output.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Arc::new(GitHubOutputFile::new(path)),
            _ => Arc::new(StdoutOutput),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    println!("{WELCOME}");

    match run(&cli).await {
        Ok(result) => print_outputs(&result),
        Err(err) => {
            println!("{}", WorkflowCommand::Error(err.to_string()));
            std::process::exit(err.exit_code());
        }
    }
}

async fn run(cli: &Cli) -> Result<PipelineResult, MinerError> {
    let config = Configuration::from_inputs(cli.inputs())?;

    let mut github = GitHubConfig::new(&cli.api_url);
    if let Some(token) = config.repo_token.as_deref() {
        github = github.with_token(token);
    }
    debug!(api_url = %github.api_url, authenticated = github.token.is_some(), "GitHub gateway configured");

    let pipeline = VersionPipeline::new(
        Arc::new(GitHubGateway::new(github)?),
        Arc::new(XmlExtractor::new()),
        cli.output_sink(),
    );

    pipeline.run(&config).await
}

fn print_outputs(result: &PipelineResult) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", WorkflowCommand::Group(OUTPUT_GROUP.to_string()))
        .and_then(|_| writeln!(stdout, "version: {}", result.version))
        .and_then(|_| writeln!(stdout, "{}", WorkflowCommand::EndGroup))
        .context("Failed to write action outputs summary")
}
