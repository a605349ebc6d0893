// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Kernel-virtual <-> physical translation consumed by the entry helpers
//! OWNERS: @kernel-mm-team
//! PUBLIC API: KernelMap, LinearMap, directory_for_table, directory_table_kva,
//!             kernel_page_at, user_page_at, page_kva
//! INVARIANTS: Alignment is checked on the kernel virtual address before translating;
//!             translation never wraps around the 32-bit address space
//!
//! Page tables and mapped pages are usually handled through their kernel
//! virtual addresses. These helpers accept those addresses and translate
//! with a caller-provided [`KernelMap`].

use crate::addr::{PhysAddr, VirtAddr};
use crate::contract::require_page_aligned;
use crate::entry::Entry;
use crate::EntryError;

/// Translation between kernel virtual addresses and physical addresses.
pub trait KernelMap {
    /// Physical address backing the kernel virtual address `va`.
    fn address_to_physical(&self, va: VirtAddr) -> crate::Result<PhysAddr>;

    /// Kernel virtual address through which `pa` is reachable.
    fn physical_to_kernel_virtual(&self, pa: PhysAddr) -> crate::Result<VirtAddr>;
}

/// Physical memory mapped linearly starting at virtual address `base`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinearMap {
    base: u32,
}

impl LinearMap {
    /// Kernel window starting at 3 GiB.
    pub const HIGHER_HALF: Self = Self::new(0xc000_0000);

    /// Creates a window whose first byte maps physical address zero.
    pub const fn new(base: u32) -> Self {
        Self { base }
    }

    /// First kernel virtual address.
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Returns true if `va` lies inside the kernel window.
    pub const fn is_kernel_address(&self, va: VirtAddr) -> bool {
        va.raw() >= self.base
    }
}

impl KernelMap for LinearMap {
    fn address_to_physical(&self, va: VirtAddr) -> crate::Result<PhysAddr> {
        if !self.is_kernel_address(va) {
            return Err(EntryError::NotKernelAddress { addr: va.raw() });
        }
        Ok(PhysAddr::new(va.raw() - self.base))
    }

    fn physical_to_kernel_virtual(&self, pa: PhysAddr) -> crate::Result<VirtAddr> {
        pa.raw()
            .checked_add(self.base)
            .map(VirtAddr::new)
            .ok_or(EntryError::Unreachable { addr: pa.raw() })
    }
}

/// Directory entry for the page table at kernel virtual address `table`.
pub fn directory_for_table(table: VirtAddr, map: &impl KernelMap) -> crate::Result<Entry> {
    require_page_aligned(table.raw())?;
    Entry::try_directory(map.address_to_physical(table)?)
}

/// Kernel virtual address of the page table a present directory entry points to.
pub fn directory_table_kva(entry: Entry, map: &impl KernelMap) -> crate::Result<VirtAddr> {
    map.physical_to_kernel_virtual(entry.try_directory_table()?)
}

/// Kernel-only page-table entry for the page at kernel virtual address `page`.
pub fn kernel_page_at(
    page: VirtAddr,
    writable: bool,
    map: &impl KernelMap,
) -> crate::Result<Entry> {
    require_page_aligned(page.raw())?;
    Entry::try_kernel_page(map.address_to_physical(page)?, writable)
}

/// User-accessible page-table entry for the page at kernel virtual address `page`.
pub fn user_page_at(
    page: VirtAddr,
    writable: bool,
    map: &impl KernelMap,
) -> crate::Result<Entry> {
    require_page_aligned(page.raw())?;
    Entry::try_user_page(map.address_to_physical(page)?, writable)
}

/// Kernel virtual address of the frame in `entry`'s address field.
pub fn page_kva(entry: Entry, map: &impl KernelMap) -> crate::Result<VirtAddr> {
    map.physical_to_kernel_virtual(entry.page_frame())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: LinearMap = LinearMap::HIGHER_HALF;

    #[test]
    fn linear_map_round_trips_kernel_addresses() {
        let va = VirtAddr::new(0xc010_2000);
        let pa = MAP.address_to_physical(va).unwrap();
        assert_eq!(pa, PhysAddr::new(0x0010_2000));
        assert_eq!(MAP.physical_to_kernel_virtual(pa).unwrap(), va);
    }

    #[test]
    fn user_addresses_do_not_translate() {
        assert_eq!(
            MAP.address_to_physical(VirtAddr::new(0x0804_8000)),
            Err(EntryError::NotKernelAddress { addr: 0x0804_8000 })
        );
    }

    #[test]
    fn high_physical_addresses_are_unreachable() {
        assert_eq!(
            MAP.physical_to_kernel_virtual(PhysAddr::new(0x4000_0000)),
            Err(EntryError::Unreachable { addr: 0x4000_0000 })
        );
        assert_eq!(
            MAP.physical_to_kernel_virtual(PhysAddr::new(0x3fff_f000)),
            Ok(VirtAddr::new(0xffff_f000))
        );
    }

    #[test]
    fn directory_helpers_translate_both_ways() {
        let table = VirtAddr::new(0xc003_0000);
        let pde = directory_for_table(table, &MAP).unwrap();
        assert_eq!(pde.raw(), 0x0003_0007);
        assert_eq!(directory_table_kva(pde, &MAP).unwrap(), table);
    }

    #[test]
    fn directory_table_kva_rejects_absent_entry() {
        assert_eq!(
            directory_table_kva(Entry::ABSENT, &MAP),
            Err(EntryError::NotPresent { raw: 0 })
        );
    }

    #[test]
    fn page_helpers_set_privilege() {
        let page = VirtAddr::new(0xc050_0000);
        let kernel = kernel_page_at(page, true, &MAP).unwrap();
        let user = user_page_at(page, false, &MAP).unwrap();
        assert_eq!(kernel.raw(), 0x0050_0003);
        assert_eq!(user.raw(), 0x0050_0005);
        assert_eq!(page_kva(kernel, &MAP).unwrap(), page);
    }

    #[test]
    fn alignment_is_checked_before_translation() {
        // 0x0000_0001 is neither aligned nor a kernel address; alignment wins.
        assert_eq!(
            kernel_page_at(VirtAddr::new(1), false, &MAP),
            Err(EntryError::Unaligned { addr: 1 })
        );
        assert_eq!(
            directory_for_table(VirtAddr::new(0xc000_0800), &MAP),
            Err(EntryError::Unaligned { addr: 0xc000_0800 })
        );
    }
}
