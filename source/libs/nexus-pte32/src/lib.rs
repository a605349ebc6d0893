// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

//! CONTEXT: Codec for 32-bit two-level page-directory and page-table entries
//! OWNERS: @kernel-mm-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! PUBLIC API: Entry, EntryFlags, EntryState, Resident, Swapped, Unloaded, SwapSlot,
//!             VirtAddr, PhysAddr, KernelMap, LinearMap, EntryError
//! DEPENDS_ON: bitflags, static_assertions, thiserror, log
//! INVARIANTS: Bit layout matches the MMU walk (address 31:12, flags 11:0, 11:9 OS-owned);
//!             swap slots stay below MAX_SWAP_SLOT; resident frames are page aligned
//!
//! Virtual addresses split into three fields:
//!
//! ```text
//!  31                  22 21                  12 11                   0
//! +----------------------+----------------------+----------------------+
//! | Page Directory Index |   Page Table Index   |     Page Offset      |
//! +----------------------+----------------------+----------------------+
//! ```
//!
//! Directory and table entries share one format. The address field holds a
//! physical frame while the entry is present and is reused for a swap slot
//! once the page has been evicted:
//!
//! ```text
//!  31                                 12 11    9 8     0
//! +------------------------------------+-------+-------+
//! |  frame address  /  swap slot       |  AVL  | flags |
//! +------------------------------------+-------+-------+
//! ```
//!
//! The raw codec lives on [`Entry`]. [`Entry::state`] adds a tagged view so
//! that callers cannot read a swap slot out of a resident entry or a frame
//! out of a swapped one.

pub mod addr;
pub mod contract;
pub mod entry;
pub mod kernel_map;
pub mod layout;
pub mod state;

pub use addr::{directory_index, table_index, PhysAddr, VirtAddr};
pub use contract::EntryError;
pub use entry::Entry;
pub use kernel_map::{KernelMap, LinearMap};
pub use layout::{EntryFlags, MAX_SWAP_SLOT, PGBITS, PGSIZE};
pub use state::{EntryState, Resident, SwapSlot, Swapped, Unloaded};

/// Result type returned by the fallible codec entry points.
pub type Result<T> = core::result::Result<T, EntryError>;

/// Log target shared by every message this crate emits.
pub(crate) const LOG_TARGET: &str = "pte32";


#[cfg(test)]
mod tests_prop;
