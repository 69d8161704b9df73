// Milk-V Duo: 64 MiB of DRAM mapped at 0x80000000.

/// The kernel starts here.
pub const KERNEL_BASE: usize = 0x8000_0000;
/// The end of physical memory.
pub const PHYSICAL_END: usize = KERNEL_BASE + (64 * 1024 * 1024);
