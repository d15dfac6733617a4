//! Directory deploy engine
//!
//! Replaces every copy of a frontend file under a target tree with the
//! source copy. Unchanged targets are skipped by content hash, changed
//! ones are swapped in atomically, and targets that fail transiently
//! (usually because someone has the file open) are retried on an
//! interval by a background worker until they succeed or the run is
//! cancelled.

pub mod discover;
pub mod event;
pub mod replace;
pub mod retry;

pub use discover::{find_targets, TRANSIENT_LOCK_PREFIX};
pub use event::DeployEvent;
pub use replace::{replace_file, ReplaceOutcome};
pub use retry::RetryState;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::{AccdevError, AccdevResult};

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// One file to bring up to date.
#[derive(Debug, Clone)]
pub struct DeployTarget {
    pub source: PathBuf,
    pub target: PathBuf,
    /// No further attempts will be made, successful or not.
    pub completed: bool,
    /// Completed because retrying can never succeed.
    pub fatal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploySummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl DeploySummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub retry_interval: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Shared state of one deploy run.
///
/// The target list lives behind a single mutex; attempts snapshot it,
/// do their file work unlocked, and take the lock again only to record
/// the outcome.
pub struct DeployRun {
    targets: Mutex<Vec<DeployTarget>>,
    cancel: CancelToken,
}

impl DeployRun {
    pub fn new(source: PathBuf, targets: Vec<PathBuf>, cancel: CancelToken) -> Self {
        let targets = targets
            .into_iter()
            .map(|target| DeployTarget {
                source: source.clone(),
                target,
                completed: false,
                fatal: false,
            })
            .collect();
        Self {
            targets: Mutex::new(targets),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Targets still eligible for another attempt.
    pub fn pending_count(&self) -> usize {
        self.targets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.completed)
            .count()
    }

    pub fn summary(&self) -> DeploySummary {
        let targets = self.targets.lock().unwrap();
        let total = targets.len();
        let succeeded = targets.iter().filter(|t| t.completed && !t.fatal).count();
        DeploySummary {
            total,
            succeeded,
            failed: total - succeeded,
        }
    }

    /// Attempt every pending target once, emitting an event per outcome.
    ///
    /// Returns early if the run is cancelled between attempts. File work
    /// happens with the target list unlocked.
    pub fn attempt_pending<F>(&self, on_event: &F)
    where
        F: Fn(DeployEvent),
    {
        let pending: Vec<(usize, PathBuf, PathBuf)> = {
            let targets = self.targets.lock().unwrap();
            targets
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.completed)
                .map(|(i, t)| (i, t.source.clone(), t.target.clone()))
                .collect()
        };

        for (index, source, target) in pending {
            if self.cancel.is_cancelled() {
                return;
            }
            let outcome = replace::replace_file(&source, &target, &self.cancel);
            let path = target.display().to_string();
            let event = {
                let mut targets = self.targets.lock().unwrap();
                let record = &mut targets[index];
                match outcome {
                    ReplaceOutcome::UpToDate => {
                        record.completed = true;
                        DeployEvent::UpToDate { path }
                    }
                    ReplaceOutcome::Replaced => {
                        record.completed = true;
                        DeployEvent::Replaced { path }
                    }
                    ReplaceOutcome::Transient { message } => DeployEvent::ReplaceFailed {
                        path,
                        message,
                        retryable: true,
                    },
                    ReplaceOutcome::Fatal { message } => {
                        record.completed = true;
                        record.fatal = true;
                        DeployEvent::ReplaceFailed {
                            path,
                            message,
                            retryable: false,
                        }
                    }
                }
            };
            on_event(event);
        }
    }
}

/// Deploy `source` to every matching file under `target_root`.
///
/// Discovery, a first replacement pass, and a retry loop for anything
/// still pending. The summary event is emitted whether the run finishes,
/// fails partially, or is cancelled.
pub fn deploy<F>(
    source: &Path,
    target_root: &Path,
    options: &DeployOptions,
    cancel: &CancelToken,
    on_event: F,
) -> AccdevResult<DeploySummary>
where
    F: Fn(DeployEvent) + Sync,
{
    if !source.is_file() {
        return Err(AccdevError::FileNotFound {
            path: source.to_path_buf(),
        });
    }
    if !target_root.is_dir() {
        return Err(AccdevError::DirectoryNotFound {
            path: target_root.to_path_buf(),
        });
    }

    let mut targets = discover::find_targets(source, target_root)?;
    let mut fallback = None;
    if targets.is_empty() {
        // Nothing to update anywhere under the root. Seed a copy at the
        // top so the deploy still lands somewhere visible.
        let file_name = source.file_name().ok_or_else(|| AccdevError::FileNotFound {
            path: source.to_path_buf(),
        })?;
        let destination = target_root.join(file_name);
        fallback = Some(destination.clone());
        targets.push(destination);
    }

    on_event(DeployEvent::RunStarted {
        source: source.display().to_string(),
        target_root: target_root.display().to_string(),
        targets: targets.len(),
    });
    if let Some(destination) = &fallback {
        on_event(DeployEvent::FallbackCopy {
            destination: destination.display().to_string(),
        });
    }

    let run = DeployRun::new(source.to_path_buf(), targets, cancel.clone());
    run.attempt_pending(&on_event);

    if run.pending_count() > 0 && !cancel.is_cancelled() {
        std::thread::scope(|scope| {
            let worker =
                scope.spawn(|| retry::run_retry_loop(&run, options.retry_interval, &on_event));
            worker
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        });
    }

    if cancel.is_cancelled() {
        on_event(DeployEvent::Cancelled {
            pending: run.pending_count(),
        });
    }

    let summary = run.summary();
    on_event(DeployEvent::RunComplete {
        total: summary.total,
        succeeded: summary.succeeded,
        failed: summary.failed,
    });
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn run_deploy(
        source: &Path,
        target_root: &Path,
    ) -> (AccdevResult<DeploySummary>, Vec<DeployEvent>) {
        let events = Mutex::new(Vec::new());
        let result = deploy(
            source,
            target_root,
            &DeployOptions::default(),
            &CancelToken::new(),
            |e| events.lock().unwrap().push(e),
        );
        (result, events.into_inner().unwrap())
    }

    #[test]
    fn updates_stale_copies_and_skips_current_ones() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"X").unwrap();

        let root = dir.path().join("deployed");
        fs::create_dir_all(root.join("dir1")).unwrap();
        fs::create_dir_all(root.join("dir2")).unwrap();
        fs::write(root.join("dir1/Main.accdb"), b"Y").unwrap();
        fs::write(root.join("dir2/Main.accdb"), b"X").unwrap();

        let (result, events) = run_deploy(&source, &root);
        let summary = result.unwrap();
        assert_eq!(
            summary,
            DeploySummary {
                total: 2,
                succeeded: 2,
                failed: 0
            }
        );
        assert_eq!(fs::read(root.join("dir1/Main.accdb")).unwrap(), b"X");
        assert_eq!(fs::read(root.join("dir2/Main.accdb")).unwrap(), b"X");

        let replaced = events
            .iter()
            .filter(|e| matches!(e, DeployEvent::Replaced { .. }))
            .count();
        let up_to_date = events
            .iter()
            .filter(|e| matches!(e, DeployEvent::UpToDate { .. }))
            .count();
        assert_eq!((replaced, up_to_date), (1, 1));
    }

    #[test]
    fn falls_back_to_root_copy_when_nothing_matches() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"fresh").unwrap();

        let root = dir.path().join("deployed");
        fs::create_dir_all(&root).unwrap();

        let (result, events) = run_deploy(&source, &root);
        let summary = result.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(fs::read(root.join("Main.accdb")).unwrap(), b"fresh");
        assert!(events
            .iter()
            .any(|e| matches!(e, DeployEvent::FallbackCopy { .. })));
    }

    #[test]
    fn missing_source_is_a_precondition_error() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("deployed");
        fs::create_dir_all(&root).unwrap();

        let (result, events) = run_deploy(&dir.path().join("nope.accdb"), &root);
        assert!(matches!(result, Err(AccdevError::FileNotFound { .. })));
        assert!(events.is_empty());
    }

    #[test]
    fn missing_target_root_is_a_precondition_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"x").unwrap();

        let (result, _) = run_deploy(&source, &dir.path().join("nope"));
        assert!(matches!(result, Err(AccdevError::DirectoryNotFound { .. })));
    }

    #[test]
    fn events_bracket_the_run() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"x").unwrap();
        let root = dir.path().join("deployed");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("Main.accdb"), b"y").unwrap();

        let (_, events) = run_deploy(&source, &root);
        assert!(matches!(events.first(), Some(DeployEvent::RunStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(DeployEvent::RunComplete { .. })
        ));
    }

    #[test]
    fn fatal_outcome_completes_the_target_as_failed() {
        let dir = tempdir().unwrap();
        // Source never existed, so the attempt cannot ever succeed.
        let source = dir.path().join("gone.accdb");
        let target = dir.path().join("gone-target.accdb");
        fs::write(&target, b"old").unwrap();

        let run = DeployRun::new(source, vec![target], CancelToken::new());
        let events = Mutex::new(Vec::new());
        run.attempt_pending(&|e| events.lock().unwrap().push(e));

        assert_eq!(run.pending_count(), 0);
        assert_eq!(
            run.summary(),
            DeploySummary {
                total: 1,
                succeeded: 0,
                failed: 1
            }
        );
        assert!(events.lock().unwrap().iter().any(|e| matches!(
            e,
            DeployEvent::ReplaceFailed {
                retryable: false,
                ..
            }
        )));
    }

    #[test]
    fn cancelled_run_still_reports_a_summary() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"x").unwrap();
        let root = dir.path().join("deployed");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("Main.accdb"), b"y").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let events = Mutex::new(Vec::new());
        let summary = deploy(
            &source,
            &root,
            &DeployOptions::default(),
            &cancel,
            |e| events.lock().unwrap().push(e),
        )
        .unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
        let events = events.into_inner().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, DeployEvent::Cancelled { pending: 1 })));
        assert!(matches!(
            events.last(),
            Some(DeployEvent::RunComplete { .. })
        ));
        // No attempt ran, so the stale copy is untouched.
        assert_eq!(fs::read(root.join("Main.accdb")).unwrap(), b"y");
    }
}
