//! Physical memory allocator, for user processes,
//! kernel stacks, page-table pages,
//! and pipe buffers. Allocates whole 4096-byte pages.

use crate::{
    arch::{is_page_aligned, pg_round_up, PAGE_SHIFT, PAGE_SIZE},
    mem::{layout::MemoryLayout, memset},
    sync::SpinMutex,
};
use arrayvec::ArrayVec;
use core::{
    alloc::{GlobalAlloc, Layout},
    fmt,
    ptr::{null_mut, NonNull},
};
use log::{debug, trace};

/// Written over every page as it is freed.
pub const FREE_POISON: u8 = 0x01;
/// Written over every page as it is allocated.
pub const ALLOC_JUNK: u8 = 0x05;

/// Index of a page counted from the first page of the managed range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PageIndex(usize);

/// Stored at the start of each free page.
#[repr(C)]
struct Run {
    next: Option<PageIndex>,
}

/// Intrusive LIFO of free pages.
///
/// Every index reachable from `head` names a page
/// inside the managed range that nobody else owns.
struct FreeList {
    base: usize,
    head: Option<PageIndex>,
}
impl FreeList {
    const fn new(base: usize) -> FreeList {
        FreeList { base, head: None }
    }
    fn addr(&self, page: PageIndex) -> usize {
        self.base + (page.0 << PAGE_SHIFT)
    }
    fn run(&self, page: PageIndex) -> *mut Run {
        self.addr(page) as *mut Run
    }
    /// The caller must own `page` and it must be backed by memory.
    unsafe fn push(&mut self, page: PageIndex) {
        self.run(page).write(Run { next: self.head });
        self.head = Some(page);
    }
    fn pop(&mut self) -> Option<PageIndex> {
        let page = self.head?;
        // Pages in the list are backed and hold a Run written by push.
        self.head = unsafe { self.run(page).read().next };
        Some(page)
    }
    fn iter(&self) -> impl Iterator<Item = PageIndex> + '_ {
        core::iter::successors(self.head, |&page| unsafe { self.run(page).read().next })
    }
}

/// Why a page could not be returned to the allocator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FreeError {
    Misaligned { addr: usize },
    BelowRange { addr: usize, lower: usize },
    AboveRange { addr: usize, upper: usize },
}
impl fmt::Display for FreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FreeError::Misaligned { addr } => write!(f, "{:#x} is not page-aligned", addr),
            FreeError::BelowRange { addr, lower } => {
                write!(f, "{:#x} is below managed memory at {:#x}", addr, lower)
            }
            FreeError::AboveRange { addr, upper } => {
                write!(f, "{:#x} is past the end of managed memory at {:#x}", addr, upper)
            }
        }
    }
}

/// Hands out and takes back whole pages of the managed range.
///
/// The free list lock keeps device interrupts off on the calling hart,
/// so interrupt handlers may allocate and free pages.
pub struct PageAllocator {
    layout: MemoryLayout,
    freelist: SpinMutex<FreeList>,
}
impl PageAllocator {
    /// Creates an allocator with nothing in it. Call `init` before use.
    pub const fn new(layout: MemoryLayout) -> PageAllocator {
        PageAllocator {
            layout,
            freelist: SpinMutex::new(FreeList::new(layout.first_page())),
        }
    }
    pub fn layout(&self) -> MemoryLayout {
        self.layout
    }

    /// Gives every whole page of the managed range to the free list.
    ///
    /// # Safety
    ///
    /// The managed range must be writable memory that nothing else uses.
    /// Must be called exactly once, before any other call on this allocator.
    pub unsafe fn init(&self) {
        let pages = self.free_range(self.layout.kernel_end(), self.layout.physical_end());
        debug_assert_eq!(pages, self.layout.page_count());
        debug!(
            "kalloc: {} pages in [{:#x}, {:#x})",
            self.layout.page_count(),
            self.layout.kernel_end(),
            self.layout.physical_end()
        );
    }

    unsafe fn free_range(&self, pa_start: usize, pa_end: usize) -> usize {
        let Some(mut p) = pg_round_up(pa_start) else {
            return 0;
        };
        let mut pages = 0;

        while p.checked_add(PAGE_SIZE).map_or(false, |top| top <= pa_end) {
            self.free_page(p as *mut u8);
            p += PAGE_SIZE;
            pages += 1;
        }
        pages
    }

    fn page_index(&self, addr: usize) -> Result<PageIndex, FreeError> {
        if !is_page_aligned(addr) {
            Err(FreeError::Misaligned { addr })
        } else if addr < self.layout.kernel_end() {
            Err(FreeError::BelowRange {
                addr,
                lower: self.layout.kernel_end(),
            })
        } else if !self.layout.contains_page(addr) {
            Err(FreeError::AboveRange {
                addr,
                upper: self.layout.physical_end(),
            })
        } else {
            Ok(PageIndex((addr - self.layout.first_page()) >> PAGE_SHIFT))
        }
    }

    /// Free the page of physical memory pointed at by `pa`,
    /// checking it first. Nothing is touched if the check fails.
    ///
    /// # Safety
    ///
    /// `pa` should have been returned by `allocate_page` and the caller
    /// must not use it afterwards. The exception is `init`.
    pub unsafe fn try_free_page(&self, pa: *mut u8) -> Result<(), FreeError> {
        let page = self.page_index(pa as usize)?;

        // Fill with junk to catch dangling refs.
        memset(pa, FREE_POISON, PAGE_SIZE);

        self.freelist.lock().push(page);
        Ok(())
    }

    /// Free the page of physical memory pointed at by `pa`.
    ///
    /// Panics if `pa` is not a page of the managed range;
    /// the free list can no longer be trusted at that point.
    ///
    /// # Safety
    ///
    /// See `try_free_page`.
    pub unsafe fn free_page(&self, pa: *mut u8) {
        if let Err(err) = self.try_free_page(pa) {
            panic!("kfree: {}", err);
        }
    }

    /// Allocate one page of physical memory.
    ///
    /// Returns `None` if no page is free. The page is
    /// filled with junk, not zeroed.
    pub fn allocate_page(&self) -> Option<NonNull<u8>> {
        let pa = {
            let mut freelist = self.freelist.lock();
            freelist.pop().map(|page| freelist.addr(page))
        };

        let Some(pa) = pa else {
            trace!("kalloc: out of pages");
            return None;
        };

        let pa = pa as *mut u8;
        // The page left the list above and belongs to us alone.
        unsafe {
            memset(pa, ALLOC_JUNK, PAGE_SIZE);
        }
        NonNull::new(pa)
    }

    /// Up to `N` free pages, in the order `allocate_page` would return them.
    pub fn free_pages<const N: usize>(&self) -> ArrayVec<NonNull<u8>, N> {
        let freelist = self.freelist.lock();
        let pages = freelist
            .iter()
            .take(N)
            .filter_map(|page| NonNull::new(freelist.addr(page) as *mut u8))
            .collect();
        pages
    }
}
impl fmt::Debug for PageAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageAllocator")
            .field("layout", &self.layout)
            .field("next_free", &self.free_pages::<4>())
            .finish()
    }
}

/// Serves allocations of at most one page.
unsafe impl GlobalAlloc for PageAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.size() > PAGE_SIZE || layout.align() > PAGE_SIZE {
            return null_mut();
        }
        self.allocate_page().map_or(null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.free_page(ptr);
    }
}
