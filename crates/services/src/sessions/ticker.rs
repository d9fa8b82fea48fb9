use std::sync::Arc;
use std::time::Duration;

use quiz_core::Finalization;
use quiz_core::model::SessionPhase;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::game::{GameSession, SessionStep};
use super::view::SessionSnapshot;
use super::workflow::GameLoopService;
use crate::error::GameServiceError;

/// Drive `session` with wall-clock ticks every `period` until it is no longer active.
///
/// The lock is held for the whole of each tick, so answers and ticks never
/// interleave. `on_step` sees the committed snapshot after every tick. Returns the
/// finalization if the session ended (by timeout here, or by an answer elsewhere).
///
/// # Errors
///
/// Returns `GameServiceError` if persisting a high score fails.
pub async fn run_ticker<F>(
    game_loop: Arc<GameLoopService>,
    session: Arc<Mutex<GameSession>>,
    period: Duration,
    mut on_step: F,
) -> Result<Option<Finalization>, GameServiceError>
where
    F: FnMut(&SessionSnapshot, &SessionStep) + Send,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let mut guard = session.lock().await;
        if guard.phase() != SessionPhase::Active {
            return Ok(guard.finalization().copied());
        }

        let step = game_loop.tick(&mut guard).await?;
        on_step(&guard.snapshot(), &step);
        if step.ended() {
            return Ok(step.finalization);
        }
    }
}
