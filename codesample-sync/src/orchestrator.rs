//! One sync invocation: change set in, backend mutations out.
//!
//! ## Protocol
//!
//! 1. Every added, modified and removed path runs as its own task. Each task
//!    returns the fragments it wants upserted and removed plus the snapshot
//!    change it would make; nothing is shared between tasks.
//! 2. Task results are merged in input order into an upsert accumulator and a
//!    removal accumulator. A failed path is recorded and skipped.
//! 3. Both accumulators are grouped by codename root.
//! 4. Removal bundles are applied, then upsert bundles, one task per bundle.
//!    A failed bundle is recorded and does not stop the others.
//! 5. Each path's snapshot change (store or archive) is committed only when
//!    every bundle fed by that path succeeded. Otherwise the previous snapshot
//!    stays, and redelivering the same change set recomputes the same delta.
//!
//! Concurrency is bounded by [`SyncConfig::concurrency`]. Every task is joined
//! before [`SyncOrchestrator::run`] returns.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use codesample_core::config::DEFAULT_CONTENT_TYPE;
use codesample_core::{
    ChangeSet, CodeFile, CodeFragment, CodenameCodeFragments, CodenameRoot, SyncConfig,
};

use crate::backend::ContentBackend;
use crate::client::{ContentSyncClient, RemoveOutcome};
use crate::error::SyncError;
use crate::grouper;
use crate::reconcile;
use crate::source::FragmentSource;
use crate::store::SnapshotStore;
use crate::webhook;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Which change class a path arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    Added,
    Modified,
    Removed,
}

/// Backend operation applied to a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleAction {
    Upsert,
    Remove,
}

/// An isolated unit of work inside one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    Path { class: ChangeClass, path: String },
    Bundle { action: BundleAction, codename: CodenameRoot },
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Path { class, path } => write!(f, "{class:?} path {path}"),
            WorkUnit::Bundle { action, codename } => write!(f, "{action:?} bundle {codename}"),
        }
    }
}

/// A unit of work that failed, with its error.
///
/// Path failures cover both fetching and committing the path's snapshot.
#[derive(Debug)]
pub struct SyncFailure {
    pub unit: WorkUnit,
    pub error: SyncError,
}

/// Outcome of one invocation.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Codename roots written by upsert, sorted.
    pub upserted: Vec<CodenameRoot>,
    /// Codename roots whose languages were cleared, sorted.
    pub cleared: Vec<CodenameRoot>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Err(SyncError::Partial)` when any unit of work failed.
    pub fn into_result(self) -> Result<SyncReport, SyncError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SyncError::Partial {
                failed: self.failures.len(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Snapshot change a path makes once its bundles are in the backend.
#[derive(Debug, Default)]
enum PendingSnapshot {
    Store(CodeFile),
    Archive(String),
    #[default]
    Keep,
}

/// Fragments one path contributes to the accumulators.
#[derive(Debug, Default)]
struct PathDelta {
    upserts: Vec<CodeFragment>,
    removals: Vec<CodeFragment>,
    pending: PendingSnapshot,
}

/// A path whose snapshot change waits on the bundle phase.
#[derive(Debug)]
struct PathCommit {
    unit: WorkUnit,
    roots: BTreeSet<CodenameRoot>,
    pending: PendingSnapshot,
}

impl PathCommit {
    fn blocked_by(&self, failed: &BTreeSet<CodenameRoot>) -> bool {
        !self.roots.is_disjoint(failed)
    }
}

pub struct SyncOrchestrator {
    store: Arc<dyn SnapshotStore>,
    source: Arc<dyn FragmentSource>,
    client: ContentSyncClient<dyn ContentBackend>,
    limiter: Arc<Semaphore>,
}

impl SyncOrchestrator {
    pub fn new(
        config: &SyncConfig,
        store: Arc<dyn SnapshotStore>,
        source: Arc<dyn FragmentSource>,
        backend: Arc<dyn ContentBackend>,
    ) -> Self {
        let content_type = config
            .backend
            .as_ref()
            .map_or(DEFAULT_CONTENT_TYPE, |backend| backend.content_type.as_str());
        tracing::debug!(
            concurrency = config.concurrency,
            project = ?config.backend.as_ref().map(|backend| backend.project_id.as_str()),
            content_type,
            "sync orchestrator ready",
        );
        Self {
            store,
            source,
            client: ContentSyncClient::new(backend).with_content_type(content_type),
            limiter: Arc::new(Semaphore::new(config.concurrency.max(1))),
        }
    }

    /// Parse a push payload and run it.
    pub async fn run_payload(&self, payload: &str) -> Result<SyncReport, SyncError> {
        let changes = webhook::parse_push(payload)?;
        Ok(self.run(&changes).await)
    }

    /// Process every path in `changes` and push the resulting bundles.
    pub async fn run(&self, changes: &ChangeSet) -> SyncReport {
        let started = Instant::now();
        let mut report = SyncReport::default();

        let (upserts, removals, commits) = self.collect_deltas(changes, &mut report).await;

        let removal_bundles = sorted_bundles(removals);
        let upsert_bundles = sorted_bundles(upserts);
        self.apply_bundles(BundleAction::Remove, removal_bundles, &mut report)
            .await;
        self.apply_bundles(BundleAction::Upsert, upsert_bundles, &mut report)
            .await;
        self.commit_snapshots(commits, &mut report).await;

        report.upserted.sort();
        report.cleared.sort();
        tracing::info!(
            paths = changes.len(),
            upserted = report.upserted.len(),
            cleared = report.cleared.len(),
            failed = report.failures.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "sync invocation finished",
        );
        report
    }

    async fn collect_deltas(
        &self,
        changes: &ChangeSet,
        report: &mut SyncReport,
    ) -> (Vec<CodeFragment>, Vec<CodeFragment>, Vec<PathCommit>) {
        let mut handles: Vec<(WorkUnit, JoinHandle<Result<PathDelta, SyncError>>)> = Vec::new();

        for path in &changes.added {
            let source = Arc::clone(&self.source);
            let path_owned = path.clone();
            handles.push((
                WorkUnit::Path {
                    class: ChangeClass::Added,
                    path: path.clone(),
                },
                self.spawn_limited(async move {
                    process_added(source.as_ref(), &path_owned).await
                }),
            ));
        }
        for path in &changes.modified {
            let (store, source) = (Arc::clone(&self.store), Arc::clone(&self.source));
            let path_owned = path.clone();
            handles.push((
                WorkUnit::Path {
                    class: ChangeClass::Modified,
                    path: path.clone(),
                },
                self.spawn_limited(async move {
                    process_modified(store.as_ref(), source.as_ref(), &path_owned).await
                }),
            ));
        }
        for path in &changes.removed {
            let store = Arc::clone(&self.store);
            let path_owned = path.clone();
            handles.push((
                WorkUnit::Path {
                    class: ChangeClass::Removed,
                    path: path.clone(),
                },
                self.spawn_limited(async move {
                    process_removed(store.as_ref(), &path_owned).await
                }),
            ));
        }

        let mut upserts = Vec::new();
        let mut removals = Vec::new();
        let mut commits = Vec::new();
        for (unit, handle) in handles {
            match join(handle).await {
                Ok(delta) => {
                    let roots = delta
                        .upserts
                        .iter()
                        .chain(&delta.removals)
                        .map(|f| CodenameRoot::from(grouper::codename_root(&f.codename)))
                        .collect();
                    commits.push(PathCommit {
                        unit,
                        roots,
                        pending: delta.pending,
                    });
                    upserts.extend(delta.upserts);
                    removals.extend(delta.removals);
                }
                Err(error) => record_failure(report, unit, error),
            }
        }
        (upserts, removals, commits)
    }

    async fn apply_bundles(
        &self,
        action: BundleAction,
        bundles: Vec<CodenameCodeFragments>,
        report: &mut SyncReport,
    ) {
        let mut handles = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            let client = self.client.clone();
            let codename = bundle.codename_root.clone();
            let handle = self.spawn_limited(async move {
                match action {
                    BundleAction::Upsert => client.upsert(&bundle).await.map(|_| true),
                    BundleAction::Remove => client
                        .remove(&bundle)
                        .await
                        .map(|outcome| matches!(outcome, RemoveOutcome::Cleared(_))),
                }
            });
            handles.push((codename, handle));
        }

        for (codename, handle) in handles {
            match join(handle).await {
                Ok(true) => match action {
                    BundleAction::Upsert => report.upserted.push(codename),
                    BundleAction::Remove => report.cleared.push(codename),
                },
                Ok(false) => {}
                Err(error) => record_failure(report, WorkUnit::Bundle { action, codename }, error),
            }
        }
    }

    async fn commit_snapshots(&self, commits: Vec<PathCommit>, report: &mut SyncReport) {
        let failed: BTreeSet<CodenameRoot> = report
            .failures
            .iter()
            .filter_map(|failure| match &failure.unit {
                WorkUnit::Bundle { codename, .. } => Some(codename.clone()),
                WorkUnit::Path { .. } => None,
            })
            .collect();

        let mut handles = Vec::new();
        for commit in commits {
            if commit.blocked_by(&failed) {
                tracing::warn!(
                    unit = %commit.unit,
                    "keeping previous snapshot; a bundle from this path failed",
                );
                continue;
            }
            let store = Arc::clone(&self.store);
            let pending = commit.pending;
            let handle =
                self.spawn_limited(async move { commit_pending(store.as_ref(), pending).await });
            handles.push((commit.unit, handle));
        }

        for (unit, handle) in handles {
            if let Err(error) = join(handle).await {
                record_failure(report, unit, error);
            }
        }
    }

    fn spawn_limited<T, Fut>(&self, task: Fut) -> JoinHandle<Result<T, SyncError>>
    where
        Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
        T: Send + 'static,
    {
        let limiter = Arc::clone(&self.limiter);
        tokio::spawn(async move {
            let _permit = limiter
                .acquire_owned()
                .await
                .map_err(|err| SyncError::Join(format!("concurrency limiter closed: {err}")))?;
            task.await
        })
    }
}

// ---------------------------------------------------------------------------
// Per-path processing
// ---------------------------------------------------------------------------

async fn process_added(source: &dyn FragmentSource, path: &str) -> Result<PathDelta, SyncError> {
    let fragments = source.fetch_fragments(path).await?;
    tracing::debug!(path, fragments = fragments.len(), "added file");
    Ok(PathDelta {
        pending: PendingSnapshot::Store(CodeFile::new(path, fragments.clone())),
        upserts: fragments,
        removals: Vec::new(),
    })
}

async fn process_modified(
    store: &dyn SnapshotStore,
    source: &dyn FragmentSource,
    path: &str,
) -> Result<PathDelta, SyncError> {
    let previous = store.get(path).await?;
    let current = source.fetch_fragments(path).await?;
    let pending = PendingSnapshot::Store(CodeFile::new(path, current.clone()));

    let Some(previous) = previous else {
        tracing::warn!(
            path,
            "no previous snapshot; treating every fragment as added, backend may keep stale samples",
        );
        return Ok(PathDelta {
            upserts: current,
            removals: Vec::new(),
            pending,
        });
    };

    let delta = reconcile::compare(&previous.fragments, &current);
    tracing::debug!(
        path,
        added = delta.added.len(),
        modified = delta.modified.len(),
        removed = delta.removed.len(),
        "reconciled file",
    );
    let mut upserts = delta.added;
    upserts.extend(delta.modified);
    Ok(PathDelta {
        upserts,
        removals: delta.removed,
        pending,
    })
}

async fn process_removed(store: &dyn SnapshotStore, path: &str) -> Result<PathDelta, SyncError> {
    match store.get(path).await? {
        Some(file) => Ok(PathDelta {
            upserts: Vec::new(),
            removals: file.fragments,
            pending: PendingSnapshot::Archive(path.to_string()),
        }),
        None => {
            tracing::debug!(path, "removed file was never tracked");
            Ok(PathDelta::default())
        }
    }
}

async fn commit_pending(
    store: &dyn SnapshotStore,
    pending: PendingSnapshot,
) -> Result<(), SyncError> {
    match pending {
        PendingSnapshot::Store(file) => store.store(&file).await?,
        PendingSnapshot::Archive(path) => {
            store.archive(&path).await?;
        }
        PendingSnapshot::Keep => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sorted_bundles(fragments: Vec<CodeFragment>) -> Vec<CodenameCodeFragments> {
    let mut bundles: Vec<_> = grouper::group_by_codename_root(fragments)
        .into_values()
        .collect();
    bundles.sort_by(|a, b| a.codename_root.cmp(&b.codename_root));
    bundles
}

async fn join<T>(handle: JoinHandle<Result<T, SyncError>>) -> Result<T, SyncError> {
    match handle.await {
        Ok(inner) => inner,
        Err(err) => Err(SyncError::Join(err.to_string())),
    }
}

fn record_failure(report: &mut SyncReport, unit: WorkUnit, error: SyncError) {
    tracing::error!(unit = %unit, error = %error, "unit of work failed");
    report.failures.push(SyncFailure { unit, error });
}
