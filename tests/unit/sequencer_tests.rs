use job_sequencer::sequencer::HookKind;
use job_sequencer::{
    HookFailurePolicy, JobError, Sequencer, SequencerConfig, SequencerState, SequencerStats,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    }

    async fn increment(counter: Arc<AtomicU64>) -> Result<u64, std::io::Error> {
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    // --- sequencing ---

    #[tokio::test]
    async fn test_shared_counter_resolves_one_two_three() {
        init_tracing();
        let sequencer = Sequencer::new();
        let counter = Arc::new(AtomicU64::new(0));

        let a = sequencer.submit({
            let counter = counter.clone();
            move || increment(counter)
        });
        let b = sequencer.submit({
            let counter = counter.clone();
            move || increment(counter)
        });
        let c = sequencer.submit({
            let counter = counter.clone();
            move || increment(counter)
        });

        assert_eq!(a.unwrap().await.unwrap(), 1);
        assert_eq!(b.unwrap().await.unwrap(), 2);
        assert_eq!(c.unwrap().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_awaiting_each_submission_in_turn() {
        let sequencer = Sequencer::new();
        let counter = Arc::new(AtomicU64::new(0));

        for expected in 1..=3 {
            let counter = counter.clone();
            let value = sequencer
                .submit(move || increment(counter))
                .unwrap()
                .await
                .unwrap();
            assert_eq!(value, expected);
        }
        assert_eq!(sequencer.next_id(), 3);
    }

    // --- failures ---

    #[tokio::test]
    async fn test_two_failures_then_success() {
        init_tracing();
        let sequencer = Sequencer::new();
        let rejected = Arc::new(AtomicU64::new(0));

        let hook_count = rejected.clone();
        sequencer.set_on_rejected(move |_job| {
            let count = hook_count.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let first = sequencer
            .submit(|| async { Err::<(), _>(std::io::Error::other("first")) })
            .unwrap();
        let second = sequencer
            .submit(|| async { Err::<(), _>(std::io::Error::other("second")) })
            .unwrap();
        let third = sequencer
            .submit(|| async { Ok::<_, std::io::Error>("third") })
            .unwrap();

        let first_err = first.await.unwrap_err().into_failure().unwrap();
        assert_eq!(first_err.to_string(), "first");
        let second_err = second.await.unwrap_err();
        assert!(matches!(second_err, JobError::Failed(ref e) if e.to_string() == "second"));
        assert_eq!(third.await.unwrap(), "third");

        sequencer.idle().await;
        assert_eq!(rejected.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_job_error_converts_into_boxed_error() {
        let sequencer = Sequencer::new();

        let run = async {
            let value = sequencer
                .submit(|| async { Err::<u8, _>(std::io::Error::other("unavailable")) })?
                .await?;
            Ok::<u8, Box<dyn std::error::Error + Send + Sync>>(value)
        };

        let error = run.await.unwrap_err();
        assert_eq!(error.to_string(), "job failed: unavailable");
    }

    // --- hooks and lifecycle ---

    #[tokio::test]
    async fn test_full_lifecycle_with_stats() {
        init_tracing();
        let sequencer = Sequencer::with_config(
            SequencerConfig::default()
                .with_name("lifecycle")
                .with_pending_warn_threshold(2),
        );
        assert_eq!(sequencer.config().name, "lifecycle");

        let executed = Arc::new(Mutex::new(Vec::new()));
        let recorder = executed.clone();
        sequencer.set_on_executed(move |job| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(job.id);
                Ok(())
            }
        });
        sequencer.set_on_resolved(|job| async move {
            anyhow::ensure!(job.id != 3, "refusing job {}", job.id);
            Ok(())
        });
        assert!(sequencer.hook(HookKind::Rejected).is_none());

        let handles: Vec<_> = (0..5u64)
            .map(|i| {
                sequencer
                    .submit(move || async move {
                        if i == 1 {
                            Err(format!("job {i} failed"))
                        } else {
                            Ok(i * 10)
                        }
                    })
                    .unwrap()
            })
            .collect();
        assert_eq!(sequencer.state(), SequencerState::Draining);

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await);
        }
        assert_eq!(results[0], Ok(0));
        assert_eq!(results[1], Err(JobError::Failed("job 1 failed".to_string())));
        assert_eq!(results[3], Ok(30));
        assert_eq!(results[4], Ok(40));

        sequencer.idle().await;
        assert_eq!(sequencer.state(), SequencerState::Idle);
        assert_eq!(*executed.lock().unwrap(), vec![0, 1, 2, 3, 4]);

        let stats = sequencer.stats();
        assert_eq!(
            stats,
            SequencerStats {
                submitted: 5,
                executed: 5,
                resolved: 4,
                rejected: 1,
                hook_failures: 1,
                drains: 1,
            }
        );
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"hook_failures\":1"));
    }

    #[tokio::test]
    async fn test_halt_policy_recovers_on_next_submission() {
        let sequencer = Sequencer::with_config(
            SequencerConfig::default().with_hook_failure_policy(HookFailurePolicy::Halt),
        );
        sequencer.set_on_executed(|job| async move {
            anyhow::ensure!(job.id != 0, "executed hook failed");
            Ok(())
        });

        let first = sequencer
            .submit(|| async { Ok::<_, std::io::Error>(0) })
            .unwrap();
        let second = sequencer
            .submit(|| async { Ok::<_, std::io::Error>(1) })
            .unwrap();

        assert_eq!(first.await.unwrap(), 0);
        sequencer.idle().await;
        assert_eq!(sequencer.pending_len(), 1);

        let third = sequencer
            .submit(|| async { Ok::<_, std::io::Error>(2) })
            .unwrap();
        assert_eq!(second.await.unwrap(), 1);
        assert_eq!(third.await.unwrap(), 2);
        assert_eq!(sequencer.stats().drains, 2);
    }

    #[tokio::test]
    async fn test_panicking_job_routes_to_rejected_hook() {
        let sequencer = Sequencer::new();
        let rejected = Arc::new(Mutex::new(Vec::new()));

        let recorder = rejected.clone();
        sequencer.set_on_rejected(move |job| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(job.id);
                Ok(())
            }
        });

        let handle = sequencer
            .submit(|| async {
                let values: Vec<u8> = Vec::new();
                Ok::<_, std::io::Error>(values[0])
            })
            .unwrap();
        let err = handle.await.unwrap_err();
        assert!(matches!(err, JobError::Panicked { job_id: 0 }));
        assert!(!err.is_failed());

        sequencer.idle().await;
        assert_eq!(*rejected.lock().unwrap(), vec![0]);
        assert_eq!(sequencer.stats().rejected, 1);
    }
}
