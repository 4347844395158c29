//! Best-effort commit and push of the output files.
//!
//! Mirrors the workflow's `git commit ... || true` step: every git failure is logged and
//! reported in the outcome, never returned as an error, so a missing diff or a push
//! conflict cannot fail the scheduled job.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::settings::PublishSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The files match HEAD; no commit was created.
    NothingToCommit,
    /// A commit was created. `pushed` is false when push was disabled or failed.
    Committed { pushed: bool },
    /// A git step failed before a commit could be made.
    Failed { step: &'static str, message: String },
}

/// Stage `files` in the repository at `repo_dir`, commit them if they changed and push.
pub fn publish(repo_dir: &Path, files: &[PathBuf], settings: &PublishSettings) -> PublishOutcome {
    // git resolves pathspecs against its working directory, which is `repo_dir`.
    let file_args: Vec<&Path> = files
        .iter()
        .map(|p| p.strip_prefix(repo_dir).unwrap_or(p))
        .collect();

    let mut add: Vec<&OsStr> = vec![OsStr::new("add"), OsStr::new("--")];
    add.extend(file_args.iter().map(|p| p.as_os_str()));
    if let Err(message) = git(repo_dir, &add) {
        return failed("add", message);
    }

    let mut diff: Vec<&OsStr> = ["diff", "--cached", "--quiet", "--"]
        .into_iter()
        .map(OsStr::new)
        .collect();
    diff.extend(file_args.iter().map(|p| p.as_os_str()));
    match run_git(repo_dir, &diff) {
        Ok(output) if output.status.success() => {
            log::info!("Publish: no changes to commit");
            return PublishOutcome::NothingToCommit;
        }
        Ok(output) if output.status.code() == Some(1) => {}
        Ok(output) => return failed("diff", stderr_of(&output)),
        Err(message) => return failed("diff", message),
    }

    let name = format!("user.name={}", settings.author_name);
    let email = format!("user.email={}", settings.author_email);
    let mut commit: Vec<&OsStr> = [
        "-c",
        name.as_str(),
        "-c",
        email.as_str(),
        "-c",
        "commit.gpgsign=false",
        "commit",
        "-m",
        settings.commit_message.as_str(),
        "--",
    ]
    .into_iter()
    .map(OsStr::new)
    .collect();
    commit.extend(file_args.iter().map(|p| p.as_os_str()));
    if let Err(message) = git(repo_dir, &commit) {
        return failed("commit", message);
    }
    log::info!("Publish: committed {} file(s)", files.len());

    if !settings.push {
        return PublishOutcome::Committed { pushed: false };
    }

    match git(repo_dir, &[OsStr::new("push")]) {
        Ok(()) => {
            log::info!("Publish: pushed");
            PublishOutcome::Committed { pushed: true }
        }
        Err(message) => {
            log::warn!("Publish: push failed (ignored): {}", message);
            PublishOutcome::Committed { pushed: false }
        }
    }
}

fn failed(step: &'static str, message: String) -> PublishOutcome {
    log::warn!("Publish: git {} failed (ignored): {}", step, message);
    PublishOutcome::Failed { step, message }
}

// Shell out rather than use libgit2 so push picks up the credentials the CI checkout
// stores in git's own config.
fn run_git(repo_dir: &Path, args: &[&OsStr]) -> Result<Output, String> {
    Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .map_err(|e| format!("failed to run git: {}", e))
}

fn git(repo_dir: &Path, args: &[&OsStr]) -> Result<(), String> {
    let output = run_git(repo_dir, args)?;
    if output.status.success() {
        Ok(())
    } else {
        Err(stderr_of(&output))
    }
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    }
}
