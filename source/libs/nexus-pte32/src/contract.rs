// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Precondition checks shared by every entry constructor and mutator
//! OWNERS: @kernel-mm-team
//! PUBLIC API: EntryError, require_page_aligned, require_swap_slot, require_present, violated
//! INVARIANTS: A failed check never yields a truncated or wrapped entry; misuse either
//!             returns EntryError from a `try_*` call or panics at the caller's location

use thiserror::Error;

use crate::layout::{EntryFlags, MAX_SWAP_SLOT};
use crate::LOG_TARGET;

/// Caller misuse detected while building or decoding an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Address has non-zero page-offset bits.
    #[error("address {addr:#010x} is not page aligned")]
    Unaligned {
        /// Offending address.
        addr: u32,
    },
    /// Swap slot does not fit below [`MAX_SWAP_SLOT`].
    #[error("swap slot {slot:#x} is not below {max:#x}", max = MAX_SWAP_SLOT)]
    SwapSlotOutOfRange {
        /// Offending slot index.
        slot: u32,
    },
    /// Entry was expected to be present.
    #[error("entry {raw:#010x} is not present")]
    NotPresent {
        /// Raw entry word.
        raw: u32,
    },
    /// Virtual address lies below the kernel window.
    #[error("virtual address {addr:#010x} is not a kernel address")]
    NotKernelAddress {
        /// Offending address.
        addr: u32,
    },
    /// Physical address cannot be reached through the kernel window.
    #[error("physical address {addr:#010x} is outside the kernel window")]
    Unreachable {
        /// Offending address.
        addr: u32,
    },
}

/// Fails with [`EntryError::Unaligned`] unless the low twelve bits are zero.
#[inline]
pub fn require_page_aligned(addr: u32) -> crate::Result<()> {
    if crate::addr::page_offset(addr) == 0 {
        Ok(())
    } else {
        Err(EntryError::Unaligned { addr })
    }
}

/// Fails with [`EntryError::SwapSlotOutOfRange`] unless `slot < MAX_SWAP_SLOT`.
#[inline]
pub fn require_swap_slot(slot: u32) -> crate::Result<()> {
    if slot < MAX_SWAP_SLOT {
        Ok(())
    } else {
        Err(EntryError::SwapSlotOutOfRange { slot })
    }
}

/// Fails with [`EntryError::NotPresent`] unless the present bit is set.
#[inline]
pub fn require_present(raw: u32) -> crate::Result<()> {
    if raw & EntryFlags::PRESENT.bits() != 0 {
        Ok(())
    } else {
        Err(EntryError::NotPresent { raw })
    }
}

/// Reports a contract violation and aborts the operation.
#[cold]
#[track_caller]
pub fn violated(err: EntryError) -> ! {
    log::error!(target: LOG_TARGET, "contract violation: {err}");
    panic!("{err}");
}

/// Unwraps a checked result, treating the error as a contract violation.
#[inline]
#[track_caller]
pub(crate) fn enforce<T>(result: crate::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => violated(err),
    }
}
