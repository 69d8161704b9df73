pub mod interrupt;

/// Bytes per page.
pub const PAGE_SIZE: usize = 4096;
/// Bits of offset within a page.
pub const PAGE_SHIFT: usize = 12;

/// The first page boundary at or above `addr`,
/// or `None` if it would lie past the end of the address space.
pub const fn pg_round_up(addr: usize) -> Option<usize> {
    match addr.checked_add(PAGE_SIZE - 1) {
        Some(top) => Some(top & !(PAGE_SIZE - 1)),
        None => None,
    }
}
pub const fn is_page_aligned(addr: usize) -> bool {
    addr & (PAGE_SIZE - 1) == 0
}
