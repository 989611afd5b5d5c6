use crate::{AppState, Effect, Msg, OutboundEvent, SessionState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Only one run is in flight at a time. A command arriving while a run is
/// active is rejected with a `Busy` event rather than queued.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CommandReceived(request) => match state.session() {
            SessionState::Idle => {
                state.start_run(request.correlation_id.clone());
                vec![Effect::StartRun(request)]
            }
            SessionState::Running | SessionState::Draining => {
                state.reject_command();
                vec![Effect::Publish(OutboundEvent::Busy {
                    run_id: request.correlation_id,
                })]
            }
            SessionState::Finished => Vec::new(),
        },
        Msg::RunProgress(progress) => match state.session() {
            SessionState::Running | SessionState::Draining => {
                vec![Effect::Publish(OutboundEvent::Progress(progress))]
            }
            SessionState::Idle | SessionState::Finished => Vec::new(),
        },
        Msg::RunCompleted(done) => match state.session() {
            SessionState::Running => {
                state.finish_run();
                vec![Effect::Publish(OutboundEvent::Done(done))]
            }
            SessionState::Draining => {
                state.finish_run();
                vec![Effect::Publish(OutboundEvent::Done(done)), Effect::Shutdown]
            }
            SessionState::Idle | SessionState::Finished => Vec::new(),
        },
        Msg::InputClosed => {
            let was_idle = state.session() == SessionState::Idle;
            state.close_input();
            if was_idle {
                vec![Effect::Shutdown]
            } else {
                Vec::new()
            }
        }
        Msg::EngineStopped => {
            state.stop();
            vec![Effect::Shutdown]
        }
    };
    (state, effects)
}
