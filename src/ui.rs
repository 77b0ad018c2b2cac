// Orchestration layer: wires the API client into the two run modes. The
// functions are small and synchronous; each blocking call gets a spinner so
// an interactive run shows progress, while all operator-facing results go to
// plain stdout in the tool's traditional format.

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::warn;

use crate::api::{ApiClient, ApiError, Snapshot};
use crate::args::Args;
use crate::config::Credentials;

/// Run one invocation against the given client. The hostname check comes
/// first: without it nothing may touch the network, not even credential
/// prompting.
pub fn run(api: &ApiClient, args: &Args) -> Result<()> {
    let Some(hostname) = args.hostname.as_deref() else {
        bail!("parameter hostname is empty");
    };

    let credentials = Credentials::resolve(args)?;
    let token = with_spinner("Authenticating...", || api.fetch_token(&credentials))?;
    let instance_id = with_spinner("Resolving instance...", || {
        api.resolve_instance(&token, hostname)
    })?;

    match args.action.as_deref() {
        Some("create") => rotate(api, &token, instance_id, args)?,
        _ => list(api, &token, instance_id)?,
    }
    Ok(())
}

/// List mode: print whatever the provider returns, in provider order.
fn list(api: &ApiClient, token: &str, instance_id: i64) -> Result<()> {
    let snapshots = with_spinner("Fetching snapshots...", || {
        api.list_snapshots(token, instance_id)
    })?;
    print!("{}", render_snapshots(&snapshots));
    Ok(())
}

/// Create mode: evict the oldest snapshots if the retention threshold is
/// reached, create the new one, then show the updated list.
fn rotate(api: &ApiClient, token: &str, instance_id: i64, args: &Args) -> Result<()> {
    let snapshots = with_spinner("Fetching snapshots...", || {
        api.list_snapshots(token, instance_id)
    })?;

    if snapshots.len() > args.noofpsnaps {
        warn!(
            count = snapshots.len(),
            threshold = args.noofpsnaps,
            "snapshot count exceeds the retention threshold"
        );
    }
    for victim in rotation_victims(&snapshots, args.noofpsnaps) {
        println!();
        println!("Deleting snapshot {victim} for instance {instance_id}");
        with_spinner("Deleting snapshot...", || {
            api.delete_snapshot(token, instance_id, victim)
        })?;
    }

    with_spinner("Creating snapshot...", || {
        api.create_snapshot(token, instance_id, &args.name, &args.description)
    })?;

    let snapshots = with_spinner("Fetching snapshots...", || {
        api.list_snapshots(token, instance_id)
    })?;
    print!("{}", render_snapshots(&snapshots));
    Ok(())
}

/// Ids to delete before creating a new snapshot, smallest first, so that the
/// count after creation stays within `max_snapshots`. Assumes snapshot ids
/// sort lexicographically in creation order (smallest = oldest).
pub fn rotation_victims(snapshots: &[Snapshot], max_snapshots: usize) -> Vec<&str> {
    if snapshots.len() < max_snapshots {
        return Vec::new();
    }
    let mut ids: Vec<&str> = snapshots.iter().map(|s| s.snapshot_id.as_str()).collect();
    ids.sort_unstable();
    // one extra slot is freed for the snapshot about to be created
    ids.truncate(snapshots.len() + 1 - max_snapshots);
    ids
}

/// Render the snapshot listing in the tool's traditional stdout format.
pub fn render_snapshots(snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return "No snapshot available\n".to_string();
    }
    let mut out = String::new();
    for snapshot in snapshots {
        out.push('\n');
        out.push_str(&format!("Snapshot ID: {}\n", snapshot.snapshot_id));
        out.push_str(&format!("Name: {}\n", snapshot.name));
        out.push_str(&format!("Creation date: {}\n", snapshot.created_date));
    }
    out
}

/// Show a spinner while the blocking call runs.
fn with_spinner<T>(message: &str, call: impl FnOnce() -> Result<T, ApiError>) -> Result<T, ApiError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = call();
    spinner.finish_and_clear();
    result
}
