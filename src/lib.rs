//! Physical page allocator for the kernel.
//!
//! Memory from the end of the kernel image up to the end of RAM
//! is handed out in whole pages through [`PageAllocator`].
//!
//! ```ignore
//! let kmem = PageAllocator::new(MemoryLayout::kernel_image());
//! unsafe { kmem.init() };
//! let page = kmem.allocate_page().expect("out of memory");
//! unsafe { kmem.free_page(page.as_ptr()) };
//! ```

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod hal;
pub mod mem;
pub mod sync;

pub use crate::{
    arch::PAGE_SIZE,
    mem::{
        kalloc::{FreeError, PageAllocator, ALLOC_JUNK, FREE_POISON},
        layout::MemoryLayout,
    },
};
