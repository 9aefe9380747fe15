//! Push notification parsing.
//!
//! A push delivers its commits in order, each listing the paths it added,
//! modified and removed. The net effect per path across all commits decides
//! which change class the path ends up in:
//!
//! | first seen as | later          | net        |
//! |---------------|----------------|------------|
//! | added         | modified       | added      |
//! | added         | removed        | (dropped)  |
//! | removed       | added          | modified   |
//! | modified      | removed        | removed    |

use std::collections::BTreeMap;

use serde::Deserialize;

use codesample_core::ChangeSet;

use crate::error::SyncError;

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(default)]
    commits: Vec<PushCommit>,
}

#[derive(Debug, Deserialize)]
struct PushCommit {
    #[serde(default)]
    added: Vec<String>,
    #[serde(default)]
    modified: Vec<String>,
    #[serde(default)]
    removed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetChange {
    Added,
    Modified,
    Removed,
}

/// Parse a push payload into the paths to add, modify and remove.
///
/// Each path appears in at most one class; every class is sorted.
pub fn parse_push(payload: &str) -> Result<ChangeSet, SyncError> {
    let push: PushPayload = serde_json::from_str(payload).map_err(SyncError::Webhook)?;

    let mut net: BTreeMap<String, NetChange> = BTreeMap::new();
    for commit in push.commits {
        for path in commit.added {
            apply(&mut net, path, NetChange::Added);
        }
        for path in commit.modified {
            apply(&mut net, path, NetChange::Modified);
        }
        for path in commit.removed {
            apply(&mut net, path, NetChange::Removed);
        }
    }

    let mut changes = ChangeSet::default();
    for (path, change) in net {
        match change {
            NetChange::Added => changes.added.push(path),
            NetChange::Modified => changes.modified.push(path),
            NetChange::Removed => changes.removed.push(path),
        }
    }
    Ok(changes)
}

fn apply(net: &mut BTreeMap<String, NetChange>, path: String, change: NetChange) {
    use NetChange::{Added, Modified, Removed};

    let merged = match (net.get(&path).copied(), change) {
        (None, change) => Some(change),
        (Some(Added), Modified) => Some(Added),
        (Some(Added), Removed) => None,
        (Some(Removed), Added) | (Some(Removed), Modified) => Some(Modified),
        (Some(_), Removed) => Some(Removed),
        (Some(previous), _) => Some(previous),
    };

    match merged {
        Some(change) => {
            net.insert(path, change);
        }
        None => {
            net.remove(&path);
        }
    }
}
