use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use grid_core::{Effect, Msg};
use grid_engine::{EngineEvent, EngineHandle, FrameSink, MessageSender};

/// Longest wait for the engine to finish its queue on shutdown. Covers one
/// WebDriver request at its default timeout.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(35);

/// Executes effects returned by `update`: starts runs on the engine and
/// publishes outbound events through the channel.
pub struct EffectRunner<S> {
    engine: &'static EngineHandle,
    publisher: MessageSender<S>,
}

impl<S: FrameSink> EffectRunner<S> {
    pub fn new(engine: &'static EngineHandle, publisher: MessageSender<S>, msg_tx: mpsc::Sender<Msg>) -> Self {
        spawn_event_loop(engine, msg_tx);
        Self { engine, publisher }
    }

    /// Returns `false` once a shutdown effect has been seen.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> bool {
        for effect in effects {
            match effect {
                Effect::StartRun(request) => {
                    engine_info!(
                        "StartRun run_id={:?} jobs={} period={}",
                        request.correlation_id,
                        request.job_ids.len(),
                        request.period
                    );
                    self.engine.start(request);
                }
                Effect::Publish(event) => {
                    if let Err(err) = self.publisher.send(&event) {
                        engine_warn!("failed to publish event: {}", err);
                    }
                }
                Effect::Shutdown => {
                    engine_info!("shutdown requested");
                    // The clipboard write trails the completion event.
                    if !self.engine.flush(SHUTDOWN_GRACE) {
                        engine_warn!("engine did not finish before shutdown");
                    }
                    return false;
                }
            }
        }
        true
    }
}

fn spawn_event_loop(engine: &'static EngineHandle, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || loop {
        let msg = match engine.try_recv() {
            Ok(Some(EngineEvent::Progress(progress))) => {
                engine_debug!(
                    "progress {}/{} {}",
                    progress.done_count,
                    progress.total_count,
                    progress.current_label
                );
                Msg::RunProgress(progress)
            }
            Ok(Some(EngineEvent::Completed(done))) => Msg::RunCompleted(done),
            Ok(None) => {
                thread::sleep(Duration::from_millis(20));
                continue;
            }
            Err(err) => {
                engine_error!("{}", err);
                let _ = msg_tx.send(Msg::EngineStopped);
                break;
            }
        };
        if msg_tx.send(msg).is_err() {
            break;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use grid_core::{update, AppState, OutboundEvent, Period, RunRequest};
    use grid_engine::{
        in_process, ElementTarget, EngineConfig, Page, PageError, RouterAttachment, RouterProbe,
    };

    /// Start page whose clipboard write takes a while to land.
    #[derive(Default)]
    struct SlowClipboardPage {
        clipboard: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl Page for SlowClipboardPage {
        async fn current_url(&self) -> Result<String, PageError> {
            Ok("https://app.example.com/stock/about?cid=1&tid=2".to_string())
        }

        async fn title(&self) -> Result<String, PageError> {
            Ok("US$1.00 Example Co (EXCO)".to_string())
        }

        async fn snapshot(&self) -> Result<String, PageError> {
            Ok("<html><body></body></html>".to_string())
        }

        async fn assign_location(&self, _url: &str) -> Result<(), PageError> {
            Err(PageError::Script("no navigation here".to_string()))
        }

        async fn click(&self, target: &ElementTarget) -> Result<(), PageError> {
            Err(PageError::ElementMissing {
                selector: target.selector.clone(),
                index: target.index,
            })
        }

        async fn probe_router(
            &self,
            _attachment: &RouterAttachment,
        ) -> Result<Option<RouterProbe>, PageError> {
            Ok(None)
        }

        async fn router_push(
            &self,
            _attachment: &RouterAttachment,
            _path: &str,
            _query: &[(String, String)],
        ) -> Result<(), PageError> {
            Err(PageError::Script("no router".to_string()))
        }

        async fn write_clipboard(&self, text: &str) -> Result<(), PageError> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            *self.clipboard.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn draining_shutdown_waits_for_clipboard_write() {
        engine_logging::initialize_for_tests();
        let page = Arc::new(SlowClipboardPage::default());
        let engine: &'static EngineHandle =
            Box::leak(Box::new(EngineHandle::new(page.clone(), EngineConfig::default())));
        let (publisher, mut published) = in_process::<OutboundEvent>();
        let (msg_tx, msg_rx) = mpsc::channel();
        let mut runner = EffectRunner::new(engine, publisher, msg_tx);

        let request = RunRequest::new(Vec::new(), Period::Annual, Some("r1".to_string()));
        let (state, effects) = update(AppState::new(), Msg::CommandReceived(request));
        assert!(runner.enqueue(effects));
        let (mut state, effects) = update(state, Msg::InputClosed);
        assert!(effects.is_empty());

        let mut keep_going = true;
        while keep_going {
            let msg = msg_rx.recv_timeout(Duration::from_secs(5)).unwrap();
            let (next, effects) = update(state, msg);
            state = next;
            keep_going = runner.enqueue(effects);
        }

        let text = match published.recv().unwrap() {
            Some(OutboundEvent::Done(done)) => done.text,
            other => panic!("expected done, got {other:?}"),
        };
        assert_eq!(page.clipboard.lock().unwrap().as_deref(), Some(text.as_str()));
    }
}
