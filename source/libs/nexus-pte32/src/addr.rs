// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Address newtypes and virtual-address decomposition
//! OWNERS: @kernel-mm-team
//! PUBLIC API: VirtAddr, PhysAddr, table_index, directory_index, page_offset,
//!             page_number, round_down, round_up
//! INVARIANTS: Every 32-bit value is a valid address; decomposition never fails

use core::fmt;

use crate::layout::{ADDR_MASK, PDSHIFT, PGBITS, PGMASK, PGSIZE, PTMASK, PTSHIFT};

/// Offset of `addr` within its page.
#[inline]
pub const fn page_offset(addr: u32) -> u32 {
    addr & PGMASK
}

/// Page number of `addr`, i.e. the ordinal of its page-table entry across
/// the whole directory.
#[inline]
pub const fn page_number(addr: u32) -> u32 {
    addr >> PGBITS
}

/// Rounds `addr` down to the start of its page.
#[inline]
pub const fn round_down(addr: u32) -> u32 {
    addr & ADDR_MASK
}

/// Rounds `addr` up to the next page boundary, or `None` past 4 GiB.
#[inline]
pub const fn round_up(addr: u32) -> Option<u32> {
    match addr.checked_add(PGSIZE - 1) {
        Some(end) => Some(round_down(end)),
        None => None,
    }
}

/// Page-table index of `va` (bits 21:12).
#[inline]
pub const fn table_index(va: u32) -> usize {
    ((va & PTMASK) >> PTSHIFT) as usize
}

/// Page-directory index of `va` (bits 31:22).
#[inline]
pub const fn directory_index(va: u32) -> usize {
    (va >> PDSHIFT) as usize
}

/// A 32-bit virtual address.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtAddr(u32);

impl VirtAddr {
    /// Wraps a raw virtual address.
    #[inline]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Offset within the containing page.
    #[inline]
    pub const fn page_offset(self) -> u32 {
        page_offset(self.0)
    }

    /// Returns true when the page-offset bits are zero.
    #[inline]
    pub const fn is_page_aligned(self) -> bool {
        self.page_offset() == 0
    }

    /// Slot of this address within its page table.
    #[inline]
    pub const fn table_index(self) -> usize {
        table_index(self.0)
    }

    /// Slot of this address's page table within the page directory.
    #[inline]
    pub const fn directory_index(self) -> usize {
        directory_index(self.0)
    }
}

impl From<u32> for VirtAddr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<VirtAddr> for u32 {
    fn from(addr: VirtAddr) -> Self {
        addr.0
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#010x})", self.0)
    }
}

/// A 32-bit physical address.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PhysAddr(u32);

impl PhysAddr {
    /// Wraps a raw physical address.
    #[inline]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Offset within the containing frame.
    #[inline]
    pub const fn page_offset(self) -> u32 {
        page_offset(self.0)
    }

    /// Returns true when the page-offset bits are zero.
    #[inline]
    pub const fn is_page_aligned(self) -> bool {
        self.page_offset() == 0
    }
}

impl From<u32> for PhysAddr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<PhysAddr> for u32 {
    fn from(addr: PhysAddr) -> Self {
        addr.0
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#010x})", self.0)
    }
}
