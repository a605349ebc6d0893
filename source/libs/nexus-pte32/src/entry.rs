// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Raw codec for page-directory and page-table entries
//! OWNERS: @kernel-mm-team
//! PUBLIC API: Entry
//! DEPENDS_ON: layout, contract
//! INVARIANTS: Constructors only accept page-aligned frames; set_swap_slot rewrites the
//!             address field alone and leaves every flag bit as it was
//!
//! The two meanings of the address field are not tracked here. Callers that
//! want the interpretation checked should go through [`Entry::state`].

use core::fmt;

use crate::addr::PhysAddr;
use crate::contract::{enforce, require_page_aligned, require_present, require_swap_slot};
use crate::layout::{EntryFlags, ADDR_MASK, PGBITS};

/// A 32-bit page-directory or page-table entry.
///
/// A zeroed entry is not present and carries no markers; freshly allocated
/// tables are made of these.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Entry(u32);

static_assertions::assert_eq_size!(Entry, u32);

impl Entry {
    /// The canonical unmapped entry.
    pub const ABSENT: Self = Self(0);

    /// Wraps a raw entry word read from a table.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw word as the MMU sees it.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Flag bits of the entry. Address bits are never reported.
    #[inline]
    pub const fn flags(self) -> EntryFlags {
        EntryFlags::from_bits_truncate(self.0)
    }

    #[inline]
    const fn has(self, flag: EntryFlags) -> bool {
        self.0 & flag.bits() != 0
    }

    #[inline]
    fn insert(&mut self, flag: EntryFlags) {
        self.0 |= flag.bits();
    }

    #[inline]
    fn remove(&mut self, flag: EntryFlags) {
        self.0 &= !flag.bits();
    }

    /// Returns true for the all-zero entry.
    #[inline]
    pub const fn is_absent(self) -> bool {
        self.0 == 0
    }

    /// Returns true when the MMU will translate through this entry.
    #[inline]
    pub const fn is_present(self) -> bool {
        self.has(EntryFlags::PRESENT)
    }

    // ——— Directory entries ———

    /// Builds a directory entry pointing at the page table at `table`.
    ///
    /// The table is reachable from every privilege level; per-page
    /// permissions are decided by the table's own entries.
    ///
    /// # Panics
    /// Panics if `table` is not page aligned.
    #[track_caller]
    pub fn directory(table: PhysAddr) -> Self {
        enforce(Self::try_directory(table))
    }

    /// Checked form of [`Entry::directory`].
    pub fn try_directory(table: PhysAddr) -> crate::Result<Self> {
        require_page_aligned(table.raw())?;
        let flags = EntryFlags::PRESENT | EntryFlags::WRITABLE | EntryFlags::USER;
        Ok(Self(table.raw() | flags.bits()))
    }

    /// Physical address of the page table this directory entry points to.
    ///
    /// # Panics
    /// Panics if the entry is not present.
    #[track_caller]
    pub fn directory_table(self) -> PhysAddr {
        enforce(self.try_directory_table())
    }

    /// Checked form of [`Entry::directory_table`].
    pub fn try_directory_table(self) -> crate::Result<PhysAddr> {
        require_present(self.0)?;
        Ok(PhysAddr::new(self.0 & ADDR_MASK))
    }

    // ——— Page-table entries ———

    /// Builds a present page-table entry mapping `frame`.
    ///
    /// The page is always readable; `writable` and `user` add write access
    /// and ring-3 access respectively.
    ///
    /// # Panics
    /// Panics if `frame` is not page aligned.
    #[track_caller]
    pub fn page(frame: PhysAddr, writable: bool, user: bool) -> Self {
        enforce(Self::try_page(frame, writable, user))
    }

    /// Checked form of [`Entry::page`].
    pub fn try_page(frame: PhysAddr, writable: bool, user: bool) -> crate::Result<Self> {
        require_page_aligned(frame.raw())?;
        let mut flags = EntryFlags::PRESENT;
        flags.set(EntryFlags::WRITABLE, writable);
        flags.set(EntryFlags::USER, user);
        Ok(Self(frame.raw() | flags.bits()))
    }

    /// Page-table entry usable only by the kernel.
    ///
    /// # Panics
    /// Panics if `frame` is not page aligned.
    #[track_caller]
    pub fn kernel_page(frame: PhysAddr, writable: bool) -> Self {
        Self::page(frame, writable, false)
    }

    /// Checked form of [`Entry::kernel_page`].
    pub fn try_kernel_page(frame: PhysAddr, writable: bool) -> crate::Result<Self> {
        Self::try_page(frame, writable, false)
    }

    /// Page-table entry usable by both user and kernel code.
    ///
    /// # Panics
    /// Panics if `frame` is not page aligned.
    #[track_caller]
    pub fn user_page(frame: PhysAddr, writable: bool) -> Self {
        Self::page(frame, writable, true)
    }

    /// Checked form of [`Entry::user_page`].
    pub fn try_user_page(frame: PhysAddr, writable: bool) -> crate::Result<Self> {
        Self::try_page(frame, writable, true)
    }

    /// Contents of the address field read as a frame address.
    ///
    /// The present bit is not consulted; on a swapped entry this returns the
    /// slot shifted into address position, which is meaningless as a frame.
    #[inline]
    pub const fn page_frame(self) -> PhysAddr {
        PhysAddr::new(self.0 & ADDR_MASK)
    }

    /// Returns true if writes are permitted.
    #[inline]
    pub const fn is_writable(self) -> bool {
        self.has(EntryFlags::WRITABLE)
    }

    /// Returns true if user-mode code may access the page.
    #[inline]
    pub const fn is_user(self) -> bool {
        self.has(EntryFlags::USER)
    }

    /// Returns true if the MMU recorded an access.
    #[inline]
    pub const fn is_accessed(self) -> bool {
        self.has(EntryFlags::ACCESSED)
    }

    /// Returns true if the MMU recorded a write.
    #[inline]
    pub const fn is_dirty(self) -> bool {
        self.has(EntryFlags::DIRTY)
    }

    /// Clears the present bit; the address field and all markers stay.
    #[inline]
    pub fn clear_present(&mut self) {
        self.remove(EntryFlags::PRESENT);
    }

    /// Clears the accessed bit.
    #[inline]
    pub fn clear_accessed(&mut self) {
        self.remove(EntryFlags::ACCESSED);
    }

    /// Clears the dirty bit.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.remove(EntryFlags::DIRTY);
    }

    // ——— OS markers ———

    /// Marks the page as backed by a memory-mapped file.
    #[inline]
    pub fn set_mmf(&mut self) {
        self.insert(EntryFlags::MMF);
    }

    /// Returns true if the page is backed by a memory-mapped file.
    #[inline]
    pub const fn is_mmf(self) -> bool {
        self.has(EntryFlags::MMF)
    }

    /// Marks the page as part of a shared mapping.
    #[inline]
    pub fn set_shared(&mut self) {
        self.insert(EntryFlags::SHARED);
    }

    /// Returns true if the page is part of a shared mapping.
    #[inline]
    pub const fn is_shared(self) -> bool {
        self.has(EntryFlags::SHARED)
    }

    // ——— Swap slots ———

    /// Stores `slot` in the address field.
    ///
    /// Only the address field is rewritten. The caller clears the present
    /// bit beforehand and must not keep using the entry as resident.
    ///
    /// # Panics
    /// Panics if `slot >= MAX_SWAP_SLOT`.
    #[track_caller]
    pub fn set_swap_slot(&mut self, slot: u32) {
        enforce(self.try_set_swap_slot(slot));
    }

    /// Checked form of [`Entry::set_swap_slot`]. The entry is left unchanged
    /// on error.
    pub fn try_set_swap_slot(&mut self, slot: u32) -> crate::Result<()> {
        require_swap_slot(slot)?;
        self.0 = (self.0 & !ADDR_MASK) | (slot << PGBITS);
        Ok(())
    }

    /// Swap slot held in the address field.
    ///
    /// Only meaningful when the caller knows the entry was swapped out.
    #[inline]
    pub const fn swap_slot(self) -> u32 {
        self.0 >> PGBITS
    }

    // ——— Marker used by the tagged view ———

    #[inline]
    pub(crate) const fn is_swapped(self) -> bool {
        self.has(EntryFlags::SWAPPED)
    }

    /// Clears every named flag outside `keep`, then sets `add`. Bits without a
    /// name and the address field pass through.
    #[inline]
    pub(crate) fn with_flags(self, keep: EntryFlags, add: EntryFlags) -> Self {
        let dropped = EntryFlags::all().difference(keep);
        Self((self.0 & !dropped.bits()) | add.bits())
    }

    #[inline]
    pub(crate) fn with_frame(self, frame: PhysAddr) -> Self {
        Self((self.0 & !ADDR_MASK) | frame.raw())
    }
}

impl From<u32> for Entry {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Entry> for u32 {
    fn from(entry: Entry) -> Self {
        entry.0
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("raw", &format_args!("{:#010x}", self.0))
            .field("flags", &self.flags())
            .finish()
    }
}
