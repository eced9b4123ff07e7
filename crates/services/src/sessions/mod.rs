mod machine;
mod query;
mod schedule;
mod state;
mod summary;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use machine::SessionMachine;
pub use schedule::Transition;
pub use state::{QueryState, SessionPhase, SessionState, TimerReading};
