// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bit positions and masks of the 32-bit entry format.
//!
//! These values are consumed directly by the processor's page walk and must
//! not drift.

use bitflags::bitflags;
use static_assertions::{const_assert, const_assert_eq};

/// Number of page-offset bits.
pub const PGBITS: u32 = 12;
/// Size of a page in bytes.
pub const PGSIZE: u32 = 1 << PGBITS;
/// Page-offset bits (11:0).
pub const PGMASK: u32 = PGSIZE - 1;

/// First page-table index bit.
pub const PTSHIFT: u32 = PGBITS;
/// Number of page-table index bits.
pub const PTBITS: u32 = 10;
/// Bytes covered by one page table.
pub const PTSPAN: u32 = 1 << PTBITS << PGBITS;
/// Page-table index bits (21:12).
pub const PTMASK: u32 = bitmask(PTSHIFT, PTBITS);

/// First page-directory index bit.
pub const PDSHIFT: u32 = PTSHIFT + PTBITS;
/// Number of page-directory index bits.
pub const PDBITS: u32 = 10;
/// Page-directory index bits (31:22).
pub const PDMASK: u32 = bitmask(PDSHIFT, PDBITS);

/// Entries in one page table or page directory.
pub const ENTRIES_PER_TABLE: usize = 1 << PTBITS;

/// Flag bits (11:0) of an entry.
pub const FLAG_MASK: u32 = 0x0000_0fff;
/// Address bits (31:12) of an entry.
pub const ADDR_MASK: u32 = 0xffff_f000;
/// Bits 11:9, ignored by the MMU and available to the kernel.
pub const AVL_MASK: u32 = 0x0000_0e00;

/// Exclusive upper bound for a swap slot stored in the address field.
pub const MAX_SWAP_SLOT: u32 = 0x000f_ffff;

const fn bitmask(shift: u32, count: u32) -> u32 {
    ((1u32 << count) - 1) << shift
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Flags stored in the low twelve bits of an entry.
    pub struct EntryFlags: u32 {
        /// 1 = present, 0 = not present.
        const PRESENT = 1 << 0;
        /// 1 = read/write, 0 = read-only.
        const WRITABLE = 1 << 1;
        /// 1 = user and kernel, 0 = kernel only.
        const USER = 1 << 2;
        /// Page is backed by a memory-mapped file.
        const MMF = 1 << 3;
        /// Page belongs to a shared mapping.
        const SHARED = 1 << 4;
        /// Set by the MMU on access.
        const ACCESSED = 1 << 5;
        /// Set by the MMU on write (page-table entries only).
        const DIRTY = 1 << 6;
        /// Address field holds a swap slot instead of a frame.
        const SWAPPED = 1 << 9;
    }
}

/// Bits that stay with the page when it changes residency.
pub(crate) const PERSISTENT: EntryFlags = EntryFlags::WRITABLE
    .union(EntryFlags::USER)
    .union(EntryFlags::MMF)
    .union(EntryFlags::SHARED);

const_assert_eq!(ADDR_MASK & FLAG_MASK, 0);
const_assert_eq!(ADDR_MASK | FLAG_MASK, u32::MAX);
const_assert_eq!(PGMASK, FLAG_MASK);
const_assert_eq!(PTMASK, 0x003f_f000);
const_assert_eq!(PDMASK, 0xffc0_0000);
const_assert_eq!(PTMASK | PDMASK, ADDR_MASK);
const_assert_eq!(PTSPAN, 0x0040_0000);
const_assert!(MAX_SWAP_SLOT <= ADDR_MASK >> PGBITS);
const_assert_eq!(EntryFlags::SWAPPED.bits() & !AVL_MASK, 0);
const_assert_eq!(EntryFlags::all().bits() & ADDR_MASK, 0);
