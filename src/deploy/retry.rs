//! Background retry loop
//!
//! Pending targets are retried on a fixed interval until every target
//! completes or the run is cancelled. The wait is condvar-backed, so a
//! cancellation interrupts the sleep immediately instead of burning the
//! rest of the interval.

use std::time::Duration;

use super::event::DeployEvent;
use super::DeployRun;

/// Phase of the retry worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Sleeping out the interval before the next pass.
    Waiting,
    /// Re-attempting every pending target.
    Retrying,
    /// Every target completed.
    Done,
    /// The run was cancelled with targets still pending.
    Cancelled,
}

/// Drive pending targets to completion.
///
/// Returns [`RetryState::Done`] once no targets remain pending, or
/// [`RetryState::Cancelled`] when the run's token fires first.
pub fn run_retry_loop<F>(run: &DeployRun, interval: Duration, on_event: &F) -> RetryState
where
    F: Fn(DeployEvent),
{
    let mut state = RetryState::Waiting;
    loop {
        state = match state {
            RetryState::Waiting => {
                if run.cancel_token().is_cancelled() {
                    RetryState::Cancelled
                } else {
                    let pending = run.pending_count();
                    if pending == 0 {
                        RetryState::Done
                    } else {
                        on_event(DeployEvent::RetryWait {
                            pending,
                            interval_secs: interval.as_secs(),
                        });
                        if run.cancel_token().wait_timeout(interval) {
                            RetryState::Cancelled
                        } else {
                            RetryState::Retrying
                        }
                    }
                }
            }
            RetryState::Retrying => {
                on_event(DeployEvent::RetryPass {
                    pending: run.pending_count(),
                });
                run.attempt_pending(on_event);
                if run.cancel_token().is_cancelled() {
                    RetryState::Cancelled
                } else if run.pending_count() == 0 {
                    RetryState::Done
                } else {
                    RetryState::Waiting
                }
            }
            RetryState::Done | RetryState::Cancelled => return state,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Instant;
    use tempfile::tempdir;

    #[test]
    fn empty_pending_finishes_without_waiting() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"src").unwrap();

        let run = DeployRun::new(source, Vec::new(), CancelToken::new());
        let started = Instant::now();
        let state = run_retry_loop(&run, Duration::from_secs(60), &|_| {});
        assert_eq!(state, RetryState::Done);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn converges_once_transient_failure_clears() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"new contents").unwrap();

        // The parent directory does not exist yet, so the first attempt
        // fails transiently.
        let target = dir.path().join("later/Main.accdb");
        let run = DeployRun::new(source, vec![target.clone()], CancelToken::new());

        let events = Mutex::new(Vec::new());
        run.attempt_pending(&|e| events.lock().unwrap().push(e));
        assert_eq!(run.pending_count(), 1);

        fs::create_dir_all(target.parent().unwrap()).unwrap();
        let state = run_retry_loop(&run, Duration::from_millis(10), &|e| {
            events.lock().unwrap().push(e)
        });

        assert_eq!(state, RetryState::Done);
        assert_eq!(run.pending_count(), 0);
        assert_eq!(fs::read(&target).unwrap(), b"new contents");

        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, DeployEvent::RetryWait { pending: 1, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, DeployEvent::RetryPass { pending: 1 })));
        assert!(events
            .iter()
            .any(|e| matches!(e, DeployEvent::Replaced { .. })));
    }

    #[test]
    fn cancelled_token_returns_before_first_wait() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"src").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let run = DeployRun::new(
            source,
            vec![dir.path().join("missing/Main.accdb")],
            cancel,
        );

        let events = Mutex::new(Vec::new());
        let started = Instant::now();
        let state = run_retry_loop(&run, Duration::from_secs(60), &|e| {
            events.lock().unwrap().push(e)
        });

        assert_eq!(state, RetryState::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(run.pending_count(), 1);
    }

    #[test]
    fn cancellation_interrupts_the_interval_wait() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("Main.accdb");
        fs::write(&source, b"src").unwrap();

        let cancel = CancelToken::new();
        let run = DeployRun::new(
            source,
            vec![dir.path().join("missing/Main.accdb")],
            cancel.clone(),
        );

        let started = Instant::now();
        let state = std::thread::scope(|scope| {
            let worker = scope.spawn(|| run_retry_loop(&run, Duration::from_secs(60), &|_| {}));
            std::thread::sleep(Duration::from_millis(50));
            cancel.cancel();
            worker.join().unwrap()
        });

        assert_eq!(state, RetryState::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
