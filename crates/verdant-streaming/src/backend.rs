//! Where chunk generation runs.
//!
//! Backends only compute [`ChunkPlan`]s. They never touch the chunk registry
//! or the instance sink; the owning thread does that when it finalizes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use verdant_terrain::TerrainGenerator;

use crate::error::StreamingError;
use crate::generation::{ChunkPlan, GenerationJob, generate_plan};

/// Which backend is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Generation runs on the calling thread at dispatch time.
    Inline,
    /// Generation runs on this many worker threads.
    Workers(usize),
}

/// Runs generation jobs and hands back plans.
pub trait GenerationBackend: Send {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Start a job. Gives the job back if the backend cannot take it now.
    fn dispatch(&mut self, job: GenerationJob) -> Result<(), GenerationJob>;

    /// Collect every finished plan without blocking.
    fn drain(&mut self) -> Vec<ChunkPlan>;

    /// Block up to `timeout` for one finished plan.
    fn wait(&mut self, timeout: Duration) -> Option<ChunkPlan>;

    /// Jobs dispatched whose plans have not been collected.
    fn outstanding(&self) -> usize;
}

/// Build the backend for a worker thread count; 0 means inline.
///
/// # Errors
///
/// [`StreamingError::WorkerSpawn`] if a worker thread cannot be started.
pub fn create_backend(
    terrain: Arc<TerrainGenerator>,
    worker_threads: usize,
    max_concurrent: usize,
) -> Result<Box<dyn GenerationBackend>, StreamingError> {
    if worker_threads == 0 {
        return Ok(Box::new(InlineBackend::new(terrain)));
    }
    Ok(Box::new(WorkerBackend::new(
        terrain,
        worker_threads,
        max_concurrent,
    )?))
}

/// Generates synchronously inside [`GenerationBackend::dispatch`].
pub struct InlineBackend {
    terrain: Arc<TerrainGenerator>,
    finished: VecDeque<ChunkPlan>,
}

impl InlineBackend {
    /// Create an inline backend.
    pub fn new(terrain: Arc<TerrainGenerator>) -> Self {
        Self {
            terrain,
            finished: VecDeque::new(),
        }
    }
}

impl GenerationBackend for InlineBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Inline
    }

    fn dispatch(&mut self, job: GenerationJob) -> Result<(), GenerationJob> {
        self.finished.push_back(generate_plan(&self.terrain, job));
        Ok(())
    }

    fn drain(&mut self) -> Vec<ChunkPlan> {
        self.finished.drain(..).collect()
    }

    fn wait(&mut self, _timeout: Duration) -> Option<ChunkPlan> {
        self.finished.pop_front()
    }

    fn outstanding(&self) -> usize {
        self.finished.len()
    }
}

/// Pool of named worker threads fed over crossbeam channels.
///
/// Workers hold only an `Arc` of the read-only terrain generator and send
/// plans back; they share no mutable state with the owning thread.
pub struct WorkerBackend {
    job_sender: Option<Sender<GenerationJob>>,
    plan_receiver: Receiver<ChunkPlan>,
    outstanding: usize,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerBackend {
    /// Spawn `threads` workers.
    ///
    /// `max_concurrent` sizes the job channel; the scheduler never has more
    /// jobs in flight than that. More threads than logical cores are clamped
    /// to the core count.
    ///
    /// # Errors
    ///
    /// [`StreamingError::WorkerSpawn`] if the OS refuses a thread.
    pub fn new(
        terrain: Arc<TerrainGenerator>,
        threads: usize,
        max_concurrent: usize,
    ) -> Result<Self, StreamingError> {
        let cores = num_cpus::get().max(1);
        let threads = if threads > cores {
            tracing::warn!(
                requested = threads,
                cores,
                "clamping generation workers to core count"
            );
            cores
        } else {
            threads.max(1)
        };

        let capacity = max_concurrent.max(1) * 2;
        let (job_sender, job_receiver) = bounded::<GenerationJob>(capacity);
        let (plan_sender, plan_receiver) = bounded::<ChunkPlan>(capacity);

        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let receiver = job_receiver.clone();
            let sender = plan_sender.clone();
            let terrain = Arc::clone(&terrain);

            let handle = std::thread::Builder::new()
                .name(format!("chunk-gen-worker-{i}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        let plan = generate_plan(&terrain, job);
                        if sender.send(plan).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|e| StreamingError::WorkerSpawn(e.to_string()))?;
            workers.push(handle);
        }

        tracing::info!(threads, "generation workers started");

        Ok(Self {
            job_sender: Some(job_sender),
            plan_receiver,
            outstanding: 0,
            workers,
        })
    }

    /// Worker thread count.
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    fn collected(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}

impl GenerationBackend for WorkerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Workers(self.workers.len())
    }

    fn dispatch(&mut self, job: GenerationJob) -> Result<(), GenerationJob> {
        let Some(sender) = &self.job_sender else {
            return Err(job);
        };
        match sender.try_send(job) {
            Ok(()) => {
                self.outstanding += 1;
                Ok(())
            }
            Err(TrySendError::Full(job) | TrySendError::Disconnected(job)) => Err(job),
        }
    }

    fn drain(&mut self) -> Vec<ChunkPlan> {
        let mut plans = Vec::new();
        while let Ok(plan) = self.plan_receiver.try_recv() {
            self.collected();
            plans.push(plan);
        }
        plans
    }

    fn wait(&mut self, timeout: Duration) -> Option<ChunkPlan> {
        match self.plan_receiver.recv_timeout(timeout) {
            Ok(plan) => {
                self.collected();
                Some(plan)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl Drop for WorkerBackend {
    fn drop(&mut self) {
        // Closing both channels ends each worker's loop at its next recv or send.
        self.job_sender.take();
        drop(std::mem::replace(
            &mut self.plan_receiver,
            crossbeam_channel::never(),
        ));
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
