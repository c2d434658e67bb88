//! # toolbelt-datastructs: generic in-memory containers
//!
//! Small containers with explicit ordering and capacity invariants, plus
//! reader/writer-locked variants for sharing across threads.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   RwLock    ┌──────────────┐
//! │ Set<T>     │ ──────────► │ SyncedSet<T> │
//! └─────┬──────┘             └──────────────┘
//!       │ membership
//!       ▼
//! ┌────────────┐  eviction   ┌──────────────┐
//! │ RingSet<T> │ ◄────────── │ RingSlice<T> │
//! └────────────┘             └──────────────┘
//!
//! ┌──────────────┐   RwLock  ┌─────────────────────┐
//! │ HashMap<K,V> │ ────────► │ SyncedHashMap<K,V>  │
//! └──────────────┘           └─────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`set`]: insertion-ordered set and its locked wrapper
//! - [`hashmap`]: map keyed by a stable string digest ([`Hashable`])
//! - [`ring`]: fixed-capacity circular buffer and its set-indexed variant
//! - [`sorted`]: descending sorted slice ([`Sortable`])
//! - [`bitset`]: fixed-size bit array
//! - [`fifo`]: locked first-in first-out queue

pub mod bitset;
pub mod fifo;
pub mod hashmap;
pub mod ring;
pub mod set;
pub mod sorted;

use thiserror::Error;

pub use bitset::BitSet;
pub use fifo::Fifo;
pub use hashmap::{HashMap, Hashable, SyncedHashMap};
pub use ring::{RingSet, RingSlice};
pub use set::{Set, SyncedSet};
pub use sorted::{SortedSlice, Sortable};

/// Container errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataStructError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Slot {0} has never been written")]
    EmptySlot(usize),
}

pub type Result<T> = std::result::Result<T, DataStructError>;
