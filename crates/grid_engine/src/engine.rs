use std::sync::{mpsc, Arc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use engine_logging::engine_info;
use grid_core::RunRequest;

use crate::config::EngineConfig;
use crate::page::Page;
use crate::runner::JobRunner;
use crate::types::{ChannelProgressSink, EngineEvent};

enum EngineCommand {
    Run(RunRequest),
    /// Answered once every command queued before it has finished.
    Flush(mpsc::Sender<()>),
}

/// The engine thread is gone: it exited or a run panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine thread has stopped")]
pub struct EngineStopped;

/// Owns the background thread that executes runs one after another on a
/// single-threaded runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(page: Arc<dyn Page>, config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            let sink = ChannelProgressSink::new(event_tx);
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Run(request) => {
                        let runner = JobRunner::new(page.as_ref(), &config, &sink);
                        runtime.block_on(runner.run(&request));
                    }
                    EngineCommand::Flush(reply) => {
                        let _ = reply.send(());
                    }
                }
            }
            engine_info!("engine thread exiting");
        });

        Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        }
    }

    /// Queues a run. Runs execute in submission order.
    pub fn start(&self, request: RunRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Run(request));
    }

    /// Blocks until every queued run, including its clipboard write, is
    /// done. False when `timeout` elapses or the engine thread is gone.
    pub fn flush(&self, timeout: Duration) -> bool {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.cmd_tx.send(EngineCommand::Flush(reply_tx)).is_err() {
            return false;
        }
        reply_rx.recv_timeout(timeout).is_ok()
    }

    /// `Ok(None)` when no event is pending; `Err` once the engine thread has
    /// stopped and every event it sent has been read.
    pub fn try_recv(&self) -> Result<Option<EngineEvent>, EngineStopped> {
        let receiver = self.event_rx.lock().map_err(|_| EngineStopped)?;
        match receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(EngineStopped),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

static ENGINE: OnceLock<EngineHandle> = OnceLock::new();

/// Process-wide engine. The first call runs `init`; later calls return the
/// existing engine without invoking `init`.
pub fn install(init: impl FnOnce() -> EngineHandle) -> &'static EngineHandle {
    ENGINE.get_or_init(init)
}

pub fn installed() -> Option<&'static EngineHandle> {
    ENGINE.get()
}
