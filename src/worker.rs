//! Background compile worker
//!
//! The worker thread is the single owner of the [`Pipeline`] and therefore of
//! the highlighter cache. Requests arrive over one FIFO channel, so a
//! reconfiguration is always applied before any compile queued after it.
//! When several compile requests are pending only the newest is compiled.
//!
//! ```text
//! sync() → CompileJob → (channel) → worker: drain, reconfigure, compile newest
//!        → on_done(CompileOutcome) → event loop → PanelController::deliver
//! ```

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::config::PreviewConfig;
use crate::pipeline::{CompilationResult, Pipeline, SqlCompiler};

/// Identifies one panel instance; a reopened panel gets a new id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub u64);

/// A request to compile `source` on behalf of a panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub panel: PanelId,
    /// Per-panel request number, strictly increasing
    pub seq: u64,
    pub source: String,
}

/// The result of a [`CompileJob`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    pub panel: PanelId,
    pub seq: u64,
    pub result: CompilationResult,
}

/// Where panel controllers send compile work
pub trait CompileScheduler {
    fn schedule(&mut self, job: CompileJob);

    /// Apply new settings; also drops the cached highlighter
    fn reconfigure(&mut self, config: &PreviewConfig);
}

enum WorkerRequest {
    Compile(CompileJob),
    Reconfigure(PreviewConfig),
    Shutdown,
}

/// Handle to the compile worker thread
pub struct CompileWorker {
    tx: Sender<WorkerRequest>,
    handle: Option<JoinHandle<()>>,
}

impl CompileWorker {
    /// Start the worker. `on_done` runs on the worker thread for every outcome.
    pub fn spawn<C, F>(pipeline: Pipeline<C>, on_done: F) -> std::io::Result<Self>
    where
        C: SqlCompiler + 'static,
        F: Fn(CompileOutcome) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("compile-worker".to_string())
            .spawn(move || run(pipeline, rx, on_done))?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    fn send(&self, request: WorkerRequest) {
        if self.tx.send(request).is_err() {
            tracing::error!("Compile worker is gone, request dropped");
        }
    }
}

impl CompileScheduler for CompileWorker {
    fn schedule(&mut self, job: CompileJob) {
        tracing::trace!(panel = job.panel.0, seq = job.seq, "Scheduling compile");
        self.send(WorkerRequest::Compile(job));
    }

    fn reconfigure(&mut self, config: &PreviewConfig) {
        self.send(WorkerRequest::Reconfigure(config.clone()));
    }
}

impl Drop for CompileWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Compile worker panicked");
            }
        }
    }
}

fn run<C, F>(mut pipeline: Pipeline<C>, rx: Receiver<WorkerRequest>, on_done: F)
where
    C: SqlCompiler,
    F: Fn(CompileOutcome),
{
    tracing::debug!("Compile worker started");

    while let Ok(first) = rx.recv() {
        let mut latest: Option<CompileJob> = None;
        let mut shutdown = false;

        for request in std::iter::once(first).chain(rx.try_iter()) {
            match request {
                WorkerRequest::Compile(job) => {
                    if let Some(superseded) = latest.replace(job) {
                        tracing::trace!(seq = superseded.seq, "Compile request superseded");
                    }
                }
                WorkerRequest::Reconfigure(config) => pipeline.reconfigure(&config),
                WorkerRequest::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }

        if shutdown {
            break;
        }

        if let Some(job) = latest {
            let result = pipeline.compile(&job.source);
            on_done(CompileOutcome {
                panel: job.panel,
                seq: job.seq,
                result,
            });
        }
    }

    tracing::debug!("Compile worker stopped");
}
