//! GitHub Actions workflow commands.
//!
//! Commands are plain stdout lines of the form `::command::message`. The
//! runner decodes `%25`, `%0D` and `%0A` in the message, so those characters
//! are escaped on the way out.

use std::fmt;

/// A workflow command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowCommand {
    /// Start a collapsible log group
    Group(String),
    /// Close the current log group
    EndGroup,
    /// Annotate the run with an error
    Error(String),
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl fmt::Display for WorkflowCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowCommand::Group(name) => {
                let name = if name.is_empty() { "Group" } else { name };
                write!(f, "::group::{}", escape_data(name))
            }
            WorkflowCommand::EndGroup => write!(f, "::endgroup::"),
            WorkflowCommand::Error(message) => write!(f, "::error::{}", escape_data(message)),
        }
    }
}
