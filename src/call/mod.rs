// Incoming-call handling: the lifecycle state machine and its async driver.
//
// session.rs owns the transition rules and emits effects; driver.rs owns the
// wall clock — it runs the timers, the reputation lookup, and the warning
// tone, and persists the finished record.

pub mod driver;
pub mod session;

pub use session::{CallAction, CallSession, CallState, Effect, IncomingCall};
