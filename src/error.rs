//! Error types for terminal probing.
//!
//! Every fallible platform call surfaces here instead of being silently
//! absorbed, so callers can decide how to treat a non-terminal input.

use std::io;
use thiserror::Error;

/// Errors that can occur while probing terminal input.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The input descriptor is not a terminal device
    #[error("input is not a terminal")]
    NotATty,

    /// Opening the terminal input (stdin dup or /dev/tty) failed
    #[error("failed to open terminal input: {source}")]
    Open {
        #[source]
        source: io::Error,
    },

    #[error("failed to read terminal attributes: {source}")]
    GetAttr {
        #[source]
        source: io::Error,
    },

    #[error("failed to update terminal attributes: {source}")]
    SetAttr {
        #[source]
        source: io::Error,
    },

    /// The pending-byte query (FIONREAD) failed
    #[error("failed to query pending input: {source}")]
    Query {
        #[source]
        source: io::Error,
    },

    /// Waiting for readiness (select) failed
    #[error("failed to poll terminal readiness: {source}")]
    Poll {
        #[source]
        source: io::Error,
    },
}
