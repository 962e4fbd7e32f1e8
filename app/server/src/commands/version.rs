//! Built-in `version` command.

use crate::command::Command;
use crate::exec::Context;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The Rust toolchain floor this crate targets.
pub const RUNTIME: &str = concat!("rust/", env!("CARGO_PKG_RUST_VERSION"));

/// Version metadata emitted by the `version` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Package version.
    pub version: CompactString,
    /// Source revision.
    pub commit: CompactString,
    /// On-disk repository format version.
    pub repo: CompactString,
    /// Target platform, as `<arch>/<os>`.
    pub system: CompactString,
    /// Toolchain identifier.
    pub runtime: CompactString,
}

impl VersionInfo {
    /// Version info for this build, with `commit` and `repo` supplied by
    /// the deployment (see `config::BuildConfig`).
    pub fn current(commit: impl Into<CompactString>, repo: impl Into<CompactString>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").into(),
            commit: commit.into(),
            repo: repo.into(),
            system: system().into(),
            runtime: RUNTIME.into(),
        }
    }
}

/// The platform the server is running on, as `<arch>/<os>`.
pub fn system() -> String {
    format!("{}/{}", std::env::consts::ARCH, std::env::consts::OS)
}

/// Build the `version` command, emitting `info` once per invocation.
pub fn command(info: VersionInfo) -> Command {
    Command::new(move |ctx: Context| {
        let info = info.clone();
        async move { ctx.emit(&info).await }
    })
    .describe("Show version information")
}
