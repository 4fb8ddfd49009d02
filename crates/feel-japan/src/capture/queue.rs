use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};

use super::artifact::artifact_path;
use super::job::{CaptureJob, JobId, JobStatus};
use super::runner::{CaptureReport, CaptureRequest, CaptureRunError, CaptureRunner};
use super::CaptureError;
use crate::config::CaptureConfig;

const RETAINED_JOBS: usize = 256;

/// Result of handing a slug to the queue.
#[derive(Debug, Clone)]
pub struct Submission {
    pub job: CaptureJob,
    /// True when the slug already had a pending job and this request joined it.
    pub coalesced: bool,
}

/// Bounded background queue for brochure captures.
///
/// A fixed pool of workers drains the queue. Captures for one slug never
/// overlap, and a slug holds at most one pending job: triggers that arrive
/// while a job is still pending join it, triggers that arrive while a job is
/// running queue a single follow-up.
#[derive(Clone)]
pub struct CaptureQueue {
    sender: mpsc::Sender<JobId>,
    shared: Arc<Shared>,
}

impl CaptureQueue {
    /// Spawns the worker pool. Must be called from within a Tokio runtime.
    pub fn start(runner: Arc<dyn CaptureRunner>, config: &CaptureConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let shared = Arc::new(Shared {
            registry: Mutex::new(Registry::default()),
            slug_locks: Mutex::new(HashMap::new()),
            output_dir: config.output_dir.clone(),
        });

        let workers = config.workers.max(1);
        for worker in 0..workers {
            tokio::spawn(worker_loop(
                worker,
                Arc::clone(&shared),
                Arc::clone(&receiver),
                Arc::clone(&runner),
            ));
        }
        info!(workers, capacity = config.queue_capacity, "capture queue started");

        Self { sender, shared }
    }

    pub fn submit(&self, slug: String, force: bool) -> Result<Submission, CaptureError> {
        let mut registry = self.shared.lock_registry();

        if let Some(job) = registry.pending_for_mut(&slug) {
            job.force |= force;
            return Ok(Submission {
                job: job.clone(),
                coalesced: true,
            });
        }

        let job = CaptureJob::pending(slug, force);
        match self.sender.try_send(job.id) {
            Ok(()) => {
                registry.insert(job.clone());
                Ok(Submission {
                    job,
                    coalesced: false,
                })
            }
            Err(TrySendError::Full(_)) => {
                warn!(slug = %job.slug, "capture queue full");
                Err(CaptureError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(CaptureError::QueueClosed),
        }
    }

    pub fn job(&self, id: JobId) -> Option<CaptureJob> {
        self.shared.lock_registry().jobs.get(&id).cloned()
    }

    /// Known jobs, newest first.
    pub fn jobs(&self) -> Vec<CaptureJob> {
        let registry = self.shared.lock_registry();
        registry
            .order
            .iter()
            .rev()
            .filter_map(|id| registry.jobs.get(id).cloned())
            .collect()
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.shared.output_dir
    }
}

async fn worker_loop(
    worker: usize,
    shared: Arc<Shared>,
    receiver: Arc<AsyncMutex<mpsc::Receiver<JobId>>>,
    runner: Arc<dyn CaptureRunner>,
) {
    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(id) = next else {
            break;
        };
        shared.run(worker, id, runner.as_ref()).await;
    }
}

struct Shared {
    registry: Mutex<Registry>,
    slug_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    output_dir: PathBuf,
}

impl Shared {
    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().expect("capture registry mutex poisoned")
    }

    fn slug_lock(&self, slug: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.slug_locks.lock().expect("capture lock mutex poisoned");
        Arc::clone(locks.entry(slug.to_string()).or_default())
    }

    fn slug_of(&self, id: JobId) -> Option<String> {
        self.lock_registry().jobs.get(&id).map(|job| job.slug.clone())
    }

    async fn run(&self, worker: usize, id: JobId, runner: &dyn CaptureRunner) {
        let Some(slug) = self.slug_of(id) else {
            return;
        };

        let lock = self.slug_lock(&slug);
        {
            let _guard = lock.lock().await;
            if let Some(request) = self.mark_running(id) {
                info!(worker, job = %id, slug = %request.slug, force = request.force, "capture started");
                let result = runner.capture(&request).await;
                self.mark_finished(id, result);
            }
        }
        self.release_slug_lock(&slug, &lock);
    }

    /// Drops the slug's lock entry once no other worker holds or awaits it.
    fn release_slug_lock(&self, slug: &str, lock: &Arc<AsyncMutex<()>>) {
        let mut locks = self.slug_locks.lock().expect("capture lock mutex poisoned");
        // One reference in the map, one held here.
        if Arc::strong_count(lock) == 2 {
            locks.remove(slug);
        }
    }

    #[cfg(test)]
    fn slug_lock_count(&self) -> usize {
        self.slug_locks
            .lock()
            .expect("capture lock mutex poisoned")
            .len()
    }

    fn mark_running(&self, id: JobId) -> Option<CaptureRequest> {
        let mut registry = self.lock_registry();
        let job = registry.jobs.get_mut(&id)?;
        job.status = JobStatus::Running;
        job.started_at = Some(Utc::now());
        let request = CaptureRequest {
            slug: job.slug.clone(),
            force: job.force,
            artifact: artifact_path(&self.output_dir, &job.slug),
        };

        if registry.pending_by_slug.get(&request.slug) == Some(&id) {
            registry.pending_by_slug.remove(&request.slug);
        }
        Some(request)
    }

    fn mark_finished(&self, id: JobId, result: Result<CaptureReport, CaptureRunError>) {
        let mut registry = self.lock_registry();
        if let Some(job) = registry.jobs.get_mut(&id) {
            job.finished_at = Some(Utc::now());
            match result {
                Ok(_) => {
                    job.status = JobStatus::Done;
                    info!(job = %id, slug = %job.slug, "capture finished");
                }
                Err(err) => {
                    job.status = JobStatus::Failed;
                    job.error = Some(err.to_string());
                    error!(job = %id, slug = %job.slug, error = %err, "capture failed");
                }
            }
        }
        registry.prune();
    }
}

#[derive(Default)]
struct Registry {
    jobs: HashMap<JobId, CaptureJob>,
    order: VecDeque<JobId>,
    pending_by_slug: HashMap<String, JobId>,
}

impl Registry {
    fn pending_for_mut(&mut self, slug: &str) -> Option<&mut CaptureJob> {
        let id = self.pending_by_slug.get(slug)?;
        self.jobs
            .get_mut(id)
            .filter(|job| job.status == JobStatus::Pending)
    }

    fn insert(&mut self, job: CaptureJob) {
        self.pending_by_slug.insert(job.slug.clone(), job.id);
        self.order.push_back(job.id);
        self.jobs.insert(job.id, job);
    }

    fn prune(&mut self) {
        while self.order.len() > RETAINED_JOBS {
            let finished = self.order.iter().position(|id| {
                self.jobs
                    .get(id)
                    .map_or(true, |job| job.status.is_finished())
            });
            let Some(position) = finished else {
                break;
            };
            if let Some(id) = self.order.remove(position) {
                self.jobs.remove(&id);
            }
        }
    }
}
