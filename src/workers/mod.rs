pub mod pending_review_digest;
pub mod weekly_puzzles;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::{PuzzleConfig, WorkerConfig};
use crate::state::GenerationLock;
use crate::store::Store;

/// Timeout for individual worker invocations (5 minutes).
const WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Drain period before scheduler shutdown to let in-flight tasks complete.
#[cfg(test)]
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);
#[cfg(not(test))]
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

const PENDING_REVIEW_DIGEST_CRON: &str = "0 0 9 * * *";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    WeeklyPuzzles,
    PendingReviewDigest,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeeklyPuzzles => "weekly_puzzles",
            Self::PendingReviewDigest => "pending_review_digest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: WorkerName,
    pub cron: String,
    pub enabled: bool,
}

pub struct WorkerManager {
    store: Arc<Store>,
    generation_lock: GenerationLock,
    shutdown_rx: broadcast::Receiver<()>,
    config: WorkerConfig,
    batch_size: usize,
}

impl WorkerManager {
    pub fn new(
        store: Arc<Store>,
        generation_lock: GenerationLock,
        shutdown_rx: broadcast::Receiver<()>,
        config: &WorkerConfig,
        puzzles: &PuzzleConfig,
    ) -> Self {
        Self {
            store,
            generation_lock,
            shutdown_rx,
            config: config.clone(),
            batch_size: puzzles.batch_size,
        }
    }

    /// Every job this instance would schedule, with its cron expression.
    pub fn planned_jobs(&self) -> Vec<JobSpec> {
        if !self.config.is_leader {
            return Vec::new();
        }

        vec![
            JobSpec {
                name: WorkerName::WeeklyPuzzles,
                cron: self.config.weekly_puzzles_cron.clone(),
                enabled: true,
            },
            JobSpec {
                name: WorkerName::PendingReviewDigest,
                cron: PENDING_REVIEW_DIGEST_CRON.to_string(),
                enabled: true,
            },
        ]
    }

    /// Catch up on the current week's batch, then run the scheduler until
    /// shutdown is broadcast.
    pub async fn start(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.config.is_leader {
            tracing::info!("Worker leader disabled; skipping worker startup");
            return Ok(());
        }

        weekly_puzzles::run(
            &self.store,
            &self.generation_lock,
            self.batch_size,
            self.config.retire_previous_week,
        )
        .await;

        let mut scheduler = JobScheduler::new().await?;
        self.register_jobs(&scheduler).await;
        scheduler.start().await?;

        tracing::info!("Worker manager started");
        let _ = self.shutdown_rx.recv().await;

        tracing::info!(
            "Worker manager shutting down, draining for {}s",
            DRAIN_TIMEOUT.as_secs()
        );
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        let _ = scheduler.shutdown().await;
        Ok(())
    }

    async fn register_jobs(&self, scheduler: &JobScheduler) {
        for spec in self.planned_jobs() {
            if !spec.enabled {
                tracing::info!(name = spec.name.as_str(), "Skipping disabled worker");
                continue;
            }

            let store = self.store.clone();
            match spec.name {
                WorkerName::WeeklyPuzzles => {
                    let lock = self.generation_lock.clone();
                    let batch_size = self.batch_size;
                    let retire_previous = self.config.retire_previous_week;
                    add_job(scheduler, &spec.cron, spec.name, move || {
                        let store = store.clone();
                        let lock = lock.clone();
                        async move {
                            weekly_puzzles::run(&store, &lock, batch_size, retire_previous).await;
                        }
                    })
                    .await;
                }
                WorkerName::PendingReviewDigest => {
                    add_job(scheduler, &spec.cron, spec.name, move || {
                        let store = store.clone();
                        async move {
                            pending_review_digest::run(&store).await;
                        }
                    })
                    .await;
                }
            }
            tracing::info!(name = spec.name.as_str(), cron = %spec.cron, "Registered worker");
        }
    }
}

/// Schedule `run` on `cron`, skipping a tick while the previous invocation
/// is still going and cutting off invocations after `WORKER_TIMEOUT`.
async fn add_job<Fut, F>(scheduler: &JobScheduler, cron: &str, name: WorkerName, mut run: F)
where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(false));
    let worker = name.as_str();

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let guard = running.clone();

        if guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(worker, "Skipping worker invocation: previous run still in progress");
            return Box::pin(async {});
        }

        let fut = run();
        Box::pin(async move {
            if tokio::time::timeout(WORKER_TIMEOUT, fut).await.is_err() {
                tracing::error!(
                    worker,
                    timeout_secs = WORKER_TIMEOUT.as_secs(),
                    "Worker timed out"
                );
            }
            guard.store(false, Ordering::SeqCst);
        })
    });

    match job {
        Ok(job) => {
            if let Err(err) = scheduler.add(job).await {
                tracing::error!(error = %err, cron, worker, "Failed to add worker job");
            }
        }
        Err(err) => tracing::error!(error = %err, cron, worker, "Failed to create worker job"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::store::Store;

    use super::*;

    fn worker_config(is_leader: bool) -> WorkerConfig {
        WorkerConfig {
            is_leader,
            weekly_puzzles_cron: "0 0 0 * * Mon".to_string(),
            retire_previous_week: false,
        }
    }

    fn puzzle_config() -> PuzzleConfig {
        PuzzleConfig {
            batch_size: 5,
            leaderboard_limit: 50,
        }
    }

    fn open_store(tmp: &tempfile::TempDir, name: &str) -> Arc<Store> {
        Arc::new(Store::open(tmp.path().join(name).to_str().unwrap()).unwrap())
    }

    #[tokio::test]
    async fn leader_switch_controls_job_registration() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (tx, _) = broadcast::channel(2);

        let follower = WorkerManager::new(
            open_store(&tmp, "follower.sled"),
            GenerationLock::default(),
            tx.subscribe(),
            &worker_config(false),
            &puzzle_config(),
        );
        assert!(follower.planned_jobs().is_empty());

        let leader = WorkerManager::new(
            open_store(&tmp, "leader.sled"),
            GenerationLock::default(),
            tx.subscribe(),
            &worker_config(true),
            &puzzle_config(),
        );
        let jobs = leader.planned_jobs();
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.enabled));
        assert_eq!(jobs[0].name, WorkerName::WeeklyPuzzles);
        assert_eq!(jobs[0].cron, "0 0 0 * * Mon");
    }

    #[tokio::test]
    async fn follower_start_returns_immediately() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (tx, _) = broadcast::channel(2);
        let store = open_store(&tmp, "follower_start.sled");

        let follower = WorkerManager::new(
            store.clone(),
            GenerationLock::default(),
            tx.subscribe(),
            &worker_config(false),
            &puzzle_config(),
        );
        follower
            .start()
            .await
            .expect("non-leader start should succeed");
        assert_eq!(store.count_puzzles().unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn leader_generates_on_startup_and_stops_on_shutdown() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (tx, _) = broadcast::channel(2);
        let store = open_store(&tmp, "leader_start.sled");

        let manager = WorkerManager::new(
            store.clone(),
            GenerationLock::default(),
            tx.subscribe(),
            &worker_config(true),
            &puzzle_config(),
        );
        let handle = tokio::spawn(manager.start());

        for _ in 0..100 {
            if store.count_puzzles().unwrap() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(store.count_puzzles().unwrap(), 5);

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("worker manager should stop")
            .unwrap()
            .unwrap();
    }

    #[test]
    fn all_worker_names_have_str() {
        for name in [WorkerName::WeeklyPuzzles, WorkerName::PendingReviewDigest] {
            assert!(!name.as_str().is_empty(), "{:?} has empty str", name);
        }
    }
}
