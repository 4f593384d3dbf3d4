//! Validation error type.

use thiserror::Error;

/// Invariant violations reported by tree validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("cached height {cached} does not match computed height {computed}")]
    HeightMismatch { cached: i32, computed: i32 },
    #[error("balance factor {0} outside [-1, 1]")]
    OutOfBalance(i32),
    #[error("in-order key sequence is not strictly increasing")]
    OrderViolation,
    #[error("{occupied} occupied slots but {reachable} reachable from the root")]
    LeakedSlots { occupied: usize, reachable: usize },
    #[error("tracked size {tracked} does not match {stored} stored nodes")]
    SizeMismatch { tracked: usize, stored: usize },
}
