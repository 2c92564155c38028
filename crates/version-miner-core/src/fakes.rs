//! In-memory fakes for the gateway and output seams (testing only)
//!
//! `MemoryGateway` serves a fixed set of owners, repositories, branches and
//! files and records every call in order. `MemoryOutput` keeps the outputs
//! it was given.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::casefold::eq_ignore_case;
use crate::error::{GatewayError, OutputError};
use crate::gateway::{GatewayResult, RepoGateway};
use crate::output::ActionOutput;

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    OwnerExists { owner: String },
    RepoExists { owner: String, repo: String },
    BranchExists { owner: String, repo: String, branch: String },
    FileContent { owner: String, repo: String, branch: String, path: String },
}

// ---------------------------------------------------------------------------
// MemoryGateway
// ---------------------------------------------------------------------------

/// In-memory repository host.
///
/// Names are matched case-insensitively, the way GitHub resolves them.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    owners: HashSet<String>,
    repos: HashSet<(String, String)>,
    branches: HashSet<(String, String, String)>,
    files: HashMap<(String, String, String, String), String>,
    failure: Option<u16>,
    calls: Mutex<Vec<GatewayCall>>,
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner/repo@branch` and everything above it.
    pub fn with_branch(mut self, owner: &str, repo: &str, branch: &str) -> Self {
        self.owners.insert(fold(owner));
        self.repos.insert((fold(owner), fold(repo)));
        self.branches.insert((fold(owner), fold(repo), fold(branch)));
        self
    }

    /// Register a file, along with its branch.
    pub fn with_file(
        mut self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: &str,
    ) -> Self {
        self = self.with_branch(owner, repo, branch);
        self.files.insert(
            (fold(owner), fold(repo), fold(branch), path.to_string()),
            content.to_string(),
        );
        self
    }

    /// Register an owner with no repositories.
    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owners.insert(fold(owner));
        self
    }

    /// Answer every call with the given HTTP status as a request failure.
    pub fn failing_with(mut self, status: u16) -> Self {
        self.failure = Some(status);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) -> GatewayResult<()> {
        let url = format!("memory://{call:?}");
        self.calls.lock().unwrap().push(call);
        match self.failure {
            Some(status) => Err(GatewayError::RequestFailed { status, url }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RepoGateway for MemoryGateway {
    async fn owner_exists(&self, owner: &str) -> GatewayResult<bool> {
        self.record(GatewayCall::OwnerExists {
            owner: owner.to_string(),
        })?;
        Ok(self.owners.iter().any(|o| eq_ignore_case(o, owner)))
    }

    async fn repo_exists(&self, owner: &str, repo: &str) -> GatewayResult<bool> {
        self.record(GatewayCall::RepoExists {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })?;
        Ok(self.repos.contains(&(fold(owner), fold(repo))))
    }

    async fn branch_exists(&self, owner: &str, repo: &str, branch: &str) -> GatewayResult<bool> {
        self.record(GatewayCall::BranchExists {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
        })?;
        Ok(self
            .branches
            .contains(&(fold(owner), fold(repo), fold(branch))))
    }

    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> GatewayResult<String> {
        self.record(GatewayCall::FileContent {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        })?;
        self.files
            .get(&(fold(owner), fold(repo), fold(branch), path.to_string()))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                url: format!("memory://{owner}/{repo}/{branch}/{path}"),
            })
    }
}

// ---------------------------------------------------------------------------
// MemoryOutput
// ---------------------------------------------------------------------------

/// Output sink that keeps `(name, value)` pairs in order.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    outputs: Mutex<Vec<(String, String)>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().unwrap().clone()
    }

    /// Last value written under `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.outputs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl ActionOutput for MemoryOutput {
    async fn set_output(&self, name: &str, value: &str) -> Result<(), OutputError> {
        if name.trim().is_empty() {
            return Err(OutputError::EmptyName);
        }
        self.outputs
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}
