// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Tagged views over an entry's two address-field interpretations
//! OWNERS: @kernel-mm-team
//! PUBLIC API: EntryState, Resident, Swapped, Unloaded, SwapSlot
//! DEPENDS_ON: entry, contract, log
//! INVARIANTS: A Swapped view always carries SWAPPED with PRESENT clear; a Resident view
//!             always carries PRESENT; transitions keep WRITABLE, USER, MMF and SHARED
//!
//! The raw codec trusts its caller to know whether the address field holds a
//! frame or a swap slot. This module records that decision in the entry
//! itself through [`EntryFlags::SWAPPED`], one of the bits the MMU ignores,
//! so a word read back from a table classifies without side bookkeeping.
//!
//! | view       | PRESENT | SWAPPED | address field     |
//! |------------|---------|---------|-------------------|
//! | `Absent`   | 0       | 0       | zero, no flags    |
//! | `Resident` | 1       | 0       | frame             |
//! | `Swapped`  | 0       | 1       | swap slot         |
//! | `Unloaded` | 0       | 0       | not interpreted   |
//!
//! A `Swapped` view is only handed out for a slot below
//! [`crate::MAX_SWAP_SLOT`], so [`Swapped::slot`] always yields a valid
//! [`SwapSlot`].

use crate::addr::PhysAddr;
use crate::contract::{enforce, require_page_aligned, require_swap_slot};
use crate::entry::Entry;
use crate::layout::{EntryFlags, PERSISTENT};
use crate::LOG_TARGET;

/// A swap-slot index known to fit the address field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SwapSlot(u32);

impl SwapSlot {
    /// Validates `slot` against [`crate::MAX_SWAP_SLOT`].
    pub fn new(slot: u32) -> crate::Result<Self> {
        require_swap_slot(slot)?;
        Ok(Self(slot))
    }

    /// Returns the slot index.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SwapSlot {
    type Error = crate::EntryError;

    fn try_from(slot: u32) -> crate::Result<Self> {
        Self::new(slot)
    }
}

/// Which interpretation of the address field is active.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// All-zero entry: nothing mapped, nothing recorded.
    Absent,
    /// Present entry whose address field is a frame.
    Resident(Resident),
    /// Not-present entry whose address field is a swap slot.
    Swapped(Swapped),
    /// Not-present entry that keeps markers but has no backing recorded here.
    Unloaded(Unloaded),
}

impl Entry {
    /// Classifies the entry.
    ///
    /// # Panics
    /// Panics if the entry is marked swapped but its address field does not
    /// hold a valid slot.
    #[track_caller]
    pub fn state(self) -> EntryState {
        enforce(self.try_state())
    }

    /// Checked form of [`Entry::state`].
    pub fn try_state(self) -> crate::Result<EntryState> {
        let state = if self.is_present() {
            EntryState::Resident(Resident(self))
        } else if self.is_swapped() {
            require_swap_slot(self.swap_slot())?;
            EntryState::Swapped(Swapped(self))
        } else if self.is_absent() {
            EntryState::Absent
        } else {
            EntryState::Unloaded(Unloaded(self))
        };
        Ok(state)
    }

    /// Resident view, if the entry is present.
    #[track_caller]
    pub fn resident(self) -> Option<Resident> {
        match self.state() {
            EntryState::Resident(resident) => Some(resident),
            _ => None,
        }
    }

    /// Swapped view, if the entry holds a swap slot.
    #[track_caller]
    pub fn swapped(self) -> Option<Swapped> {
        match self.state() {
            EntryState::Swapped(swapped) => Some(swapped),
            _ => None,
        }
    }
}

/// A present entry mapping a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resident(Entry);

impl Resident {
    /// Underlying entry word.
    #[inline]
    pub const fn entry(self) -> Entry {
        self.0
    }

    /// Mapped frame.
    #[inline]
    pub const fn frame(self) -> PhysAddr {
        self.0.page_frame()
    }

    /// Returns true if writes are permitted.
    #[inline]
    pub const fn is_writable(self) -> bool {
        self.0.is_writable()
    }

    /// Returns true if user-mode code may access the page.
    #[inline]
    pub const fn is_user(self) -> bool {
        self.0.is_user()
    }

    /// Returns true if the MMU recorded an access.
    #[inline]
    pub const fn is_accessed(self) -> bool {
        self.0.is_accessed()
    }

    /// Returns true if the MMU recorded a write.
    #[inline]
    pub const fn is_dirty(self) -> bool {
        self.0.is_dirty()
    }

    /// Returns true if the page is backed by a memory-mapped file.
    #[inline]
    pub const fn is_mmf(self) -> bool {
        self.0.is_mmf()
    }

    /// Returns true if the page is part of a shared mapping.
    #[inline]
    pub const fn is_shared(self) -> bool {
        self.0.is_shared()
    }

    /// Gives up the frame and records `slot` as the page's backing.
    ///
    /// Writing the frame's contents to the slot, and invalidating the TLB
    /// entry, are the caller's job.
    pub fn evict(self, slot: SwapSlot) -> Swapped {
        let mut entry = self.0.with_flags(PERSISTENT, EntryFlags::SWAPPED);
        entry.set_swap_slot(slot.get());
        log::trace!(
            target: LOG_TARGET,
            "evict frame={:?} slot={:#x} raw={:#010x}",
            self.frame(),
            slot.get(),
            entry.raw()
        );
        Swapped(entry)
    }

    /// Gives up the frame without recording a backing, e.g. for a clean
    /// file-backed page that can be read back from its file.
    ///
    /// A kernel read-only page has nothing left to keep, so its unloaded
    /// word is zero and [`Entry::state`] reports it as absent.
    pub fn unload(self) -> Unloaded {
        let entry = self
            .0
            .with_flags(PERSISTENT, EntryFlags::empty())
            .with_frame(PhysAddr::new(0));
        log::trace!(
            target: LOG_TARGET,
            "unload frame={:?} raw={:#010x}",
            self.frame(),
            entry.raw()
        );
        Unloaded(entry)
    }
}

/// A not-present entry whose address field holds a swap slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Swapped(Entry);

impl Swapped {
    /// Underlying entry word.
    #[inline]
    pub const fn entry(self) -> Entry {
        self.0
    }

    /// Slot holding the page's contents.
    #[inline]
    pub const fn slot(self) -> SwapSlot {
        SwapSlot(self.0.swap_slot())
    }

    /// Returns true if the page is backed by a memory-mapped file.
    #[inline]
    pub const fn is_mmf(self) -> bool {
        self.0.is_mmf()
    }

    /// Returns true if the page is part of a shared mapping.
    #[inline]
    pub const fn is_shared(self) -> bool {
        self.0.is_shared()
    }

    /// Maps the page at `frame` again, restoring its permissions.
    ///
    /// # Panics
    /// Panics if `frame` is not page aligned.
    #[track_caller]
    pub fn reload(self, frame: PhysAddr) -> Resident {
        enforce(self.try_reload(frame))
    }

    /// Checked form of [`Swapped::reload`].
    pub fn try_reload(self, frame: PhysAddr) -> crate::Result<Resident> {
        require_page_aligned(frame.raw())?;
        let entry = self
            .0
            .with_flags(PERSISTENT, EntryFlags::PRESENT)
            .with_frame(frame);
        log::trace!(
            target: LOG_TARGET,
            "reload slot={:#x} frame={:?} raw={:#010x}",
            self.0.swap_slot(),
            frame,
            entry.raw()
        );
        Ok(Resident(entry))
    }
}

/// A not-present entry that only carries markers and permissions.
///
/// Entries evicted through the raw codec (`clear_present` followed by
/// `set_swap_slot`) carry no SWAPPED marker and land here. Their slot is
/// still readable through [`Entry::swap_slot`], but [`Unloaded::load`]
/// overwrites the address field with the new frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unloaded(Entry);

impl Unloaded {
    /// Underlying entry word.
    #[inline]
    pub const fn entry(self) -> Entry {
        self.0
    }

    /// Returns true if the page is backed by a memory-mapped file.
    #[inline]
    pub const fn is_mmf(self) -> bool {
        self.0.is_mmf()
    }

    /// Returns true if the page is part of a shared mapping.
    #[inline]
    pub const fn is_shared(self) -> bool {
        self.0.is_shared()
    }

    /// Maps the page at `frame`, keeping the recorded permissions.
    ///
    /// # Panics
    /// Panics if `frame` is not page aligned.
    #[track_caller]
    pub fn load(self, frame: PhysAddr) -> Resident {
        enforce(self.try_load(frame))
    }

    /// Checked form of [`Unloaded::load`].
    pub fn try_load(self, frame: PhysAddr) -> crate::Result<Resident> {
        require_page_aligned(frame.raw())?;
        let entry = self
            .0
            .with_flags(PERSISTENT, EntryFlags::PRESENT)
            .with_frame(frame);
        log::trace!(
            target: LOG_TARGET,
            "load frame={:?} raw={:#010x}",
            frame,
            entry.raw()
        );
        Ok(Resident(entry))
    }
}
