//! Supervisor interrupt enable bit.
//!
//! On the host there is no `sstatus`; tests get a per-thread
//! stand-in for the SIE bit so lock behavior can be checked.

/// Supervisor Interrupt Enable.
pub const SSTATUS_SIE: u64 = 1 << 1;

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod csr {
    use core::arch::asm;

    #[inline(always)]
    pub unsafe fn r_sstatus() -> u64 {
        let x: u64;
        asm!("csrr {}, sstatus", out(reg) x);
        x
    }
    #[inline(always)]
    pub unsafe fn w_sstatus(x: u64) {
        asm!("csrw sstatus, {}", in(reg) x);
    }
}

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod imp {
    use super::{csr::*, SSTATUS_SIE};

    pub fn interrupts_enabled() -> bool {
        unsafe { r_sstatus() & SSTATUS_SIE != 0 }
    }
    pub unsafe fn enable_interrupts() {
        w_sstatus(r_sstatus() | SSTATUS_SIE);
    }
    pub unsafe fn disable_interrupts() {
        w_sstatus(r_sstatus() & !SSTATUS_SIE);
    }
}

#[cfg(all(test, not(all(target_arch = "riscv64", target_os = "none"))))]
mod imp {
    use super::SSTATUS_SIE;
    use std::cell::Cell;

    std::thread_local! {
        static SSTATUS: Cell<u64> = Cell::new(0);
    }

    pub fn interrupts_enabled() -> bool {
        SSTATUS.with(|s| s.get() & SSTATUS_SIE != 0)
    }
    pub unsafe fn enable_interrupts() {
        SSTATUS.with(|s| s.set(s.get() | SSTATUS_SIE));
    }
    pub unsafe fn disable_interrupts() {
        SSTATUS.with(|s| s.set(s.get() & !SSTATUS_SIE));
    }
}

#[cfg(not(any(test, all(target_arch = "riscv64", target_os = "none"))))]
mod imp {
    pub fn interrupts_enabled() -> bool {
        false
    }
    pub unsafe fn enable_interrupts() {}
    pub unsafe fn disable_interrupts() {}
}

pub use imp::*;
