use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::state::{lock, SessionState, TimerReading};

/// Shortest tick `tokio::time::interval` accepts.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Background ticker that counts whole seconds on the current question.
///
/// At most one ticker runs at a time. Each start bumps `timer_token`, and a
/// tick only lands while its token is still current.
pub(crate) struct QuestionTimer {
    tick: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl QuestionTimer {
    pub(crate) fn new(tick: Duration) -> Self {
        Self {
            tick: tick.max(MIN_TICK),
            ticker: None,
        }
    }

    /// Reset to zero and start counting. Must be called inside a tokio runtime.
    pub(crate) fn start(&mut self, shared: &Arc<Mutex<SessionState>>, state: &mut SessionState) {
        self.cancel();
        state.timer_token = state.timer_token.wrapping_add(1);
        state.timer = TimerReading {
            seconds: 0,
            running: true,
        };
        state.started = Some(Instant::now());

        let token = state.timer_token;
        let shared = Arc::downgrade(shared);
        let tick = self.tick;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick, tick);
            loop {
                interval.tick().await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let mut state = lock(&shared);
                if state.timer_token != token || !state.timer.running {
                    break;
                }
                state.timer.seconds = state.timer.seconds.saturating_add(1);
            }
        }));
    }

    /// Freeze the reading where it is.
    pub(crate) fn stop(&mut self, state: &mut SessionState) {
        self.cancel();
        state.timer_token = state.timer_token.wrapping_add(1);
        state.timer.running = false;
    }

    fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
