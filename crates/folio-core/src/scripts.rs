//! Generated version-control helper scripts.
//!
//! The engine only writes these; running them is left to the user.

use crate::CoreError;
use folio_registry::RepoLayout;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const SH_SCRIPT: &str = "commit-and-push.sh";
pub const CMD_SCRIPT: &str = "commit-and-push.cmd";

/// Paths of the two scripts written after a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitScripts {
    pub sh: PathBuf,
    pub cmd: PathBuf,
}

/// What the user should run to commit and push the publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeAction {
    pub script: PathBuf,
    /// Repository-relative invocation, e.g. `./scripts/commit-and-push.sh`.
    pub command: String,
}

impl FinalizeAction {
    /// Pick the script matching the platform this binary runs on.
    pub fn for_current_platform(layout: &RepoLayout, scripts: &CommitScripts) -> Self {
        Self::for_platform(cfg!(windows), layout, scripts)
    }

    pub fn for_platform(windows: bool, layout: &RepoLayout, scripts: &CommitScripts) -> Self {
        let dir = layout.scripts_dir_name();
        if windows {
            Self {
                script: scripts.cmd.clone(),
                command: format!("{}\\{CMD_SCRIPT}", dir.replace('/', "\\")),
            }
        } else {
            Self {
                script: scripts.sh.clone(),
                command: format!("./{dir}/{SH_SCRIPT}"),
            }
        }
    }
}

pub fn commit_message(name: &str, version: &str) -> String {
    format!("Add extension: {name} v{version}")
}

fn script_body(header: &str, layout: &RepoLayout, message: &str, newline: &str) -> String {
    let lines = [
        header.to_owned(),
        format!(
            "git add {}/ {}",
            layout.extensions_dir_name(),
            layout.registry_file()
        ),
        format!("git commit -m \"{message}\""),
        "git push".to_owned(),
    ];
    let mut out = lines.join(newline);
    out.push_str(newline);
    out
}

/// Write both scripts, replacing earlier ones.
pub fn write_commit_scripts(
    layout: &RepoLayout,
    name: &str,
    version: &str,
) -> Result<CommitScripts, CoreError> {
    let dir = layout.scripts_dir();
    fs::create_dir_all(&dir)?;
    let message = commit_message(name, version);

    let sh = dir.join(SH_SCRIPT);
    fs::write(&sh, script_body("#!/bin/bash", layout, &message, "\n"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&sh, fs::Permissions::from_mode(0o755))?;
    }

    let cmd = dir.join(CMD_SCRIPT);
    fs::write(&cmd, script_body("@echo off", layout, &message, "\r\n"))?;

    debug!("wrote commit scripts to {}", dir.display());
    Ok(CommitScripts { sh, cmd })
}
