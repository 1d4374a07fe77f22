pub mod clock;
pub mod controller;
pub mod machine;
pub mod state;

pub use clock::{ClockReading, SessionClock};
pub use controller::TimerController;
pub use machine::{SessionStateMachine, SessionTransition};
pub use state::{SessionState, SessionType, TimerSnapshot, TimerStatus};
