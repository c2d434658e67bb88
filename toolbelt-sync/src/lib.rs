//! # toolbelt-sync: counting semaphore
//!
//! ```text
//!   capacity = 3
//!   p(2) ──► held 2 ──► p(2) blocks ──► v(2) ──► held 2 (second p wakes)
//! ```
//!
//! Blocking acquisition waits on a `Condvar`; requests that could never be
//! satisfied fail fast instead of blocking forever.

pub mod semaphore;

use thiserror::Error;

pub use semaphore::{Permit, Semaphore};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Requested {requested} units from a semaphore of capacity {capacity}")]
    ExceedsCapacity { requested: usize, capacity: usize },
    #[error("Releasing {requested} units but only {held} are held")]
    OverRelease { requested: usize, held: usize },
}

pub type Result<T> = std::result::Result<T, SyncError>;
