//! Error types for the performance tracker
//!
//! Most failure modes in this crate degrade to a zero value instead of an
//! error. The variants here cover the few places where a caller can act on
//! the failure: subscribing to host signals and validating configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Performance observer is not supported by this host")]
    ObserverUnsupported,

    #[error("Failed to observe performance entries: {0}")]
    ObserverFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
