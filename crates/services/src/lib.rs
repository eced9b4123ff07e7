#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;
pub mod settings;

pub use sessions as session;

pub use error::SessionError;
pub use settings::{AdvancePolicy, SessionSettings, SummarySource};

pub use sessions::{QueryState, SessionMachine, SessionPhase, SessionState, TimerReading, Transition};
