//! Non-blocking keystroke detection for POSIX terminals.
//!
//! Answers "is input waiting on the terminal right now?" without blocking
//! and without consuming anything, for platforms that lack a native key-hit
//! primitive.

mod error;
mod mode;
mod probe;

pub use error::ProbeError;
pub use mode::TermMode;
pub use probe::{stdin_pending, KeyProbe};
