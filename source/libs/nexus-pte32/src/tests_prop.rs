// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg(test)]
//! CONTEXT: Property-based tests for the entry codec
//! OWNERS: @kernel-mm-team
//! NOTE: Tests only; no codec logic. Ensures field extraction inverts construction.
//!
//! TEST_SCOPE:
//!   - Directory/page entry construction vs. address extraction
//!   - Swap-slot encode/decode independent of prior address bits
//!   - Marker independence across swap-slot rewrites
//!   - Virtual-address decomposition
//!
//! TEST_SCENARIOS:
//!   - directory_table_inverts_directory(): aligned table address survives a PDE
//!   - page_frame_inverts_page(): frame and writable bit survive a PTE
//!   - swap_slot_roundtrip(): slot read back equals slot written, flags untouched
//!   - markers_survive_swap_slot(): MMF/SHARED unaffected by each other and by slots
//!   - indices_partition_address(): directory*1024 + table == page number
//!   - evict_reload_preserves_permissions(): tagged transitions keep W/U/markers

use super::addr::{directory_index, page_number, table_index};
use super::layout::{ADDR_MASK, FLAG_MASK, MAX_SWAP_SLOT};
use super::{Entry, EntryState, PhysAddr, SwapSlot};
use proptest::prelude::*;

fn arb_frame() -> impl Strategy<Value = PhysAddr> {
    any::<u32>().prop_map(|addr| PhysAddr::new(addr & ADDR_MASK))
}

fn arb_slot() -> impl Strategy<Value = u32> {
    0u32..MAX_SWAP_SLOT
}

proptest! {
    #[test]
    fn directory_table_inverts_directory(table in arb_frame()) {
        prop_assert_eq!(Entry::directory(table).directory_table(), table);
    }

    #[test]
    fn page_frame_inverts_page(
        frame in arb_frame(),
        writable in any::<bool>(),
        user in any::<bool>(),
    ) {
        let pte = Entry::page(frame, writable, user);
        prop_assert_eq!(pte.page_frame(), frame);
        prop_assert_eq!(pte.is_writable(), writable);
        prop_assert_eq!(pte.is_user(), user);
        prop_assert!(pte.is_present());
    }

    #[test]
    fn unaligned_frames_rejected(addr in any::<u32>()) {
        prop_assume!(addr & FLAG_MASK != 0);
        prop_assert!(Entry::try_page(PhysAddr::new(addr), true, true).is_err());
        prop_assert!(Entry::try_directory(PhysAddr::new(addr)).is_err());
    }

    #[test]
    fn swap_slot_roundtrip(raw in any::<u32>(), slot in arb_slot()) {
        let mut pte = Entry::from_raw(raw);
        pte.set_swap_slot(slot);
        prop_assert_eq!(pte.swap_slot(), slot);
        prop_assert_eq!(pte.raw() & FLAG_MASK, raw & FLAG_MASK);
    }

    #[test]
    fn slots_at_or_above_maximum_rejected(raw in any::<u32>(), slot in MAX_SWAP_SLOT..=u32::MAX) {
        let mut pte = Entry::from_raw(raw);
        prop_assert!(pte.try_set_swap_slot(slot).is_err());
        prop_assert_eq!(pte.raw(), raw);
    }

    #[test]
    fn markers_survive_swap_slot(
        raw in any::<u32>(),
        mmf in any::<bool>(),
        shared in any::<bool>(),
        slot in arb_slot(),
    ) {
        // Start with both markers clear so the generated booleans decide them.
        let mut pte = Entry::from_raw(raw & !0x18);
        if mmf {
            pte.set_mmf();
        }
        prop_assert!(!pte.is_shared());
        if shared {
            pte.set_shared();
        }
        prop_assert_eq!(pte.is_mmf(), mmf);
        pte.set_swap_slot(slot);
        prop_assert_eq!(pte.is_mmf(), mmf);
        prop_assert_eq!(pte.is_shared(), shared);
    }

    #[test]
    fn indices_partition_address(va in any::<u32>()) {
        let ordinal = directory_index(va) * 1024 + table_index(va);
        prop_assert_eq!(ordinal as u32, page_number(va));
        prop_assert_eq!(directory_index(va), directory_index(va & ADDR_MASK));
        prop_assert_eq!(table_index(va), table_index(va & ADDR_MASK));
        prop_assert!(directory_index(va) < 1024 && table_index(va) < 1024);
    }

    #[test]
    fn evict_reload_preserves_permissions(
        frame in arb_frame(),
        next in arb_frame(),
        writable in any::<bool>(),
        user in any::<bool>(),
        slot in arb_slot(),
    ) {
        let mut pte = Entry::page(frame, writable, user);
        pte.set_mmf();
        let swapped = pte.resident().unwrap().evict(SwapSlot::new(slot).unwrap());
        prop_assert_eq!(swapped.entry().state(), EntryState::Swapped(swapped));
        prop_assert_eq!(swapped.slot().get(), slot);
        let back = swapped.reload(next);
        prop_assert_eq!(back.frame(), next);
        prop_assert_eq!(back.is_writable(), writable);
        prop_assert_eq!(back.is_user(), user);
        prop_assert!(back.is_mmf());
    }
}
