use crate::arch::{pg_round_up, PAGE_SHIFT, PAGE_SIZE};

/// The physical address range the page allocator has authority over.
///
/// Bounded below by the first address after the kernel image
/// and above by the end of RAM used by the kernel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MemoryLayout {
    kernel_end: usize,
    physical_end: usize,
}
impl MemoryLayout {
    /// Address 0 can never be handed out, so `kernel_end` must be non-zero.
    pub const fn new(kernel_end: usize, physical_end: usize) -> MemoryLayout {
        assert!(kernel_end != 0, "kernel_end must be non-zero");
        MemoryLayout {
            kernel_end,
            physical_end,
        }
    }
    /// The layout of the running kernel: from the
    /// linker-provided `end` symbol up to the platform's RAM ceiling.
    #[cfg(all(target_arch = "riscv64", target_os = "none"))]
    pub fn kernel_image() -> MemoryLayout {
        extern "C" {
            // First address after kernel. Defined by kernel.ld.
            static end: [u8; 0];
        }
        let kernel_end = unsafe { core::ptr::addr_of!(end) } as usize;
        MemoryLayout::new(kernel_end, crate::hal::platform::PHYSICAL_END)
    }

    pub const fn kernel_end(&self) -> usize {
        self.kernel_end
    }
    pub const fn physical_end(&self) -> usize {
        self.physical_end
    }
    /// The first page boundary at or after `kernel_end`.
    ///
    /// If there is none, this is `physical_end` and the range holds no pages.
    pub const fn first_page(&self) -> usize {
        match pg_round_up(self.kernel_end) {
            Some(first) => first,
            None => self.physical_end,
        }
    }
    /// Number of whole pages between `first_page` and `physical_end`.
    pub const fn page_count(&self) -> usize {
        let first = self.first_page();
        if self.physical_end <= first {
            0
        } else {
            (self.physical_end - first) >> PAGE_SHIFT
        }
    }
    /// Whether the whole page starting at `addr` lies inside the range.
    pub const fn contains_page(&self, addr: usize) -> bool {
        addr >= self.kernel_end
            && addr < self.physical_end
            && self.physical_end - addr >= PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_pages_only() {
        let layout = MemoryLayout::new(0x8000_0100, 0x8000_4010);
        assert_eq!(layout.first_page(), 0x8000_1000);
        assert_eq!(layout.page_count(), 3);
        assert!(layout.contains_page(0x8000_3000));
        assert!(!layout.contains_page(0x8000_4000));
    }

    #[test]
    fn empty_when_inverted() {
        let layout = MemoryLayout::new(0x8000_5000, 0x8000_1000);
        assert_eq!(layout.page_count(), 0);
        assert!(!layout.contains_page(0x8000_5000));
    }

    #[test]
    fn platform_ceiling_is_page_aligned() {
        use crate::hal::platform::{KERNEL_BASE, PHYSICAL_END};
        assert!(crate::arch::is_page_aligned(KERNEL_BASE));
        assert!(crate::arch::is_page_aligned(PHYSICAL_END));
        assert!(PHYSICAL_END > KERNEL_BASE);
    }

    #[test]
    fn no_page_boundary_above_kernel_end() {
        let layout = MemoryLayout::new(usize::MAX - 10, usize::MAX);
        assert_eq!(layout.page_count(), 0);
        assert!(!layout.contains_page(usize::MAX & !(PAGE_SIZE - 1)));
    }

    #[test]
    #[should_panic(expected = "kernel_end must be non-zero")]
    fn rejects_null_kernel_end() {
        MemoryLayout::new(0, 0x1000);
    }
}
