use std::io::{self, BufReader};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use grid_core::{update, AppState, InboundCommand, Msg};
use grid_engine::{
    install, ChannelError, EngineHandle, LineReader, LineWriter, MessageReceiver, MessageSender,
    WebDriverPage, WebDriverSettings,
};

use super::config::{AppConfig, DEFAULT_WEBDRIVER_URL};
use super::effects::EffectRunner;
use super::logging;
use crate::cli::Cli;

/// Runs the stdin/stdout relay until input closes and the last run finishes.
pub fn run_relay(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(
        cli.log_level.unwrap_or_else(logging::default_level),
        cli.log_file.as_deref(),
    );

    let file_config = AppConfig::load(cli.config.as_deref())?;
    let endpoint = cli
        .webdriver_url
        .or_else(|| file_config.webdriver_url.clone())
        .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());
    let Some(session_id) = cli.session_id.or_else(|| file_config.session_id.clone()) else {
        bail!("no WebDriver session id; pass --session-id or set GRID_SESSION_ID");
    };
    let mut engine_config = file_config.engine_config();
    if cli.no_clipboard {
        engine_config.copy_to_clipboard = false;
    }

    let page = WebDriverPage::new(WebDriverSettings::new(endpoint.clone(), session_id.clone()))
        .context("building WebDriver client")?;
    engine_info!(
        "relay starting endpoint={} session={} config={:?}",
        endpoint,
        session_id,
        engine_config
    );
    let engine = install(move || EngineHandle::new(Arc::new(page), engine_config));

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    spawn_input_reader(msg_tx.clone());
    let publisher = MessageSender::new(LineWriter::new(io::stdout()));
    let mut runner = EffectRunner::new(engine, publisher, msg_tx);

    let mut state = AppState::new();
    while let Ok(msg) = msg_rx.recv() {
        let (next, effects) = update(state, msg);
        state = next;
        if !runner.enqueue(effects) {
            break;
        }
    }
    engine_info!(
        "relay stopped completed_runs={} rejected_commands={}",
        state.completed_runs(),
        state.rejected_commands()
    );
    Ok(())
}

fn spawn_input_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let mut commands: MessageReceiver<_, InboundCommand> =
            MessageReceiver::new(LineReader::new(BufReader::new(io::stdin())));
        loop {
            match commands.recv() {
                Ok(Some(command)) => {
                    if msg_tx.send(Msg::CommandReceived(command.into())).is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(ChannelError::Decode(err)) => {
                    engine_warn!("ignoring malformed command: {}", err);
                }
                Err(err) => {
                    engine_warn!("command input failed: {}", err);
                    break;
                }
            }
        }
        let _ = msg_tx.send(Msg::InputClosed);
    });
}
