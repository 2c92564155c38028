//! Tracing initialisation for the `version-miner` binary.
//!
//! Progress lines ("Verifying if the repository owner ... exists", "the
//! owner exists.") are plain `tracing` events written to stdout, where the
//! Actions runner interleaves them with the `::group::` and `::error::`
//! workflow commands the binary prints.
//!
//! The runner already stamps every log line with a timestamp, so the text
//! format drops its own time and target columns. `--json` switches to one
//! JSON object per line, timestamps included, for piping into other tools.
//! `--verbose` raises the level to DEBUG, which adds the per-key lookup
//! results and every GitHub request URL.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Only the first call in a
/// process installs a subscriber.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).without_time())
            .try_init()
            .ok();
    }
}
