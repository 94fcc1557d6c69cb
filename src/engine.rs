//! Engine worker: the thread that owns the book.
//!
//! One dedicated thread drains the command queue, applies each command
//! through the matching engine, steps the street-flow generator, then
//! sleeps a micro-burst. The book, the flow RNG and the output producers
//! live entirely inside that thread; everything else observes the engine
//! through the three queues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info};

use crate::command::{Command, ExecEvent, MarketDataEvent, TopOfBook};
use crate::errors::{EngineError, WorkerError};
use crate::flow::{FlowConfig, FlowGenerator};
use crate::matching::MatchingEngine;
use crate::spsc::{Consumer, Producer};

/// Commands drained per loop iteration before the flow generator gets a
/// turn. Bounds starvation by an aggressive producer.
const DRAIN_BOUND: usize = 256;

/// Loop sleep between iterations, to cap CPU burn in a demo setting.
const LOOP_PAUSE: Duration = Duration::from_micros(100);

/// Everything the worker thread owns. Moves into the thread on `start`.
struct EngineCore<const N: usize> {
    engine: MatchingEngine<N>,
    flow: FlowGenerator,
    cmd_in: Consumer<Command, N>,
}

impl<const N: usize> EngineCore<N> {
    fn run(mut self, running: &AtomicBool) -> Result<(), EngineError> {
        // Seed the book so consumers receive a meaningful top early.
        self.flow.seed_book(self.engine.book_mut())?;
        self.engine.publish_top();

        while running.load(Ordering::Acquire) {
            let mut drained = 0;
            while drained < DRAIN_BOUND {
                let Some(cmd) = self.cmd_in.pop() else { break };
                self.engine.on_command(&cmd)?;
                drained += 1;
            }

            self.flow.step(&mut self.engine)?;

            thread::sleep(LOOP_PAUSE);
        }
        Ok(())
    }
}

/// Lifecycle wrapper around the engine thread.
///
/// States: Created -> Running -> Stopped. `start` and `stop` may each be
/// called exactly once; the worker does not restart.
pub struct EngineWorker<const N: usize> {
    core: Option<EngineCore<N>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<(), EngineError>>>,
    pin_to_core: bool,
}

impl<const N: usize> EngineWorker<N> {
    pub fn new(
        cmd_in: Consumer<Command, N>,
        exec_out: Producer<ExecEvent, N>,
        md_out: Producer<MarketDataEvent, N>,
        cfg: FlowConfig,
    ) -> Self {
        Self {
            core: Some(EngineCore {
                engine: MatchingEngine::new(exec_out, md_out),
                flow: FlowGenerator::new(cfg),
                cmd_in,
            }),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            pin_to_core: false,
        }
    }

    /// Pin the worker thread to the last available core on start.
    pub fn with_core_pinning(mut self) -> Self {
        self.pin_to_core = true;
        self
    }

    /// Book snapshot before the worker starts. Once running, the book is
    /// only observable through the market-data queue.
    pub fn top_snapshot(&self) -> Option<TopOfBook> {
        self.core.as_ref().map(|core| core.engine.top_snapshot())
    }

    /// Spawn the engine thread. Fails on double start.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        let core = self.core.take().ok_or(WorkerError::AlreadyStarted)?;
        self.running.store(true, Ordering::Release);

        let running = Arc::clone(&self.running);
        let pin = self.pin_to_core;
        let handle = thread::Builder::new()
            .name("engine-worker".into())
            .spawn(move || {
                if pin {
                    pin_current_thread();
                }
                let result = core.run(&running);
                if let Err(ref e) = result {
                    error!(error = %e, "engine worker halted on broken invariant");
                }
                result
            })?;
        self.handle = Some(handle);
        info!("engine worker started");
        Ok(())
    }

    /// Flip the running flag and join the thread. Fails on double stop and
    /// surfaces any invariant breach the worker halted on.
    pub fn stop(&mut self) -> Result<(), WorkerError> {
        let handle = self.handle.take().ok_or(WorkerError::NotRunning)?;
        self.running.store(false, Ordering::Release);
        match handle.join() {
            Ok(Ok(())) => {
                info!("engine worker stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(WorkerError::Engine(e)),
            Err(_) => Err(WorkerError::Panicked),
        }
    }
}

impl<const N: usize> Drop for EngineWorker<N> {
    fn drop(&mut self) {
        // Best effort: never leave the thread detached.
        if let Some(handle) = self.handle.take() {
            self.running.store(false, Ordering::Release);
            let _ = handle.join();
        }
    }
}

/// Pin the current thread to the last available core, which is the one
/// least likely to field OS interrupts.
fn pin_current_thread() {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(last) = core_ids.last() {
            core_affinity::set_for_current(*last);
        }
    }
}
