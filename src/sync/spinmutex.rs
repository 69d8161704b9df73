use crate::arch::interrupt;
use core::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut, Drop},
    sync::atomic::{AtomicBool, Ordering},
};

/// A busy-waiting mutex.
///
/// Device interrupts are off on this hart while a guard is held,
/// so an interrupt handler can never spin on a lock its own hart holds.
/// Not reentrant: locking it again while holding
/// the guard on the same hart spins forever.
pub struct SpinMutex<T> {
    locked: AtomicBool,
    inner: UnsafeCell<T>,
}
impl<T> SpinMutex<T> {
    pub const fn new(value: T) -> SpinMutex<T> {
        SpinMutex {
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(value),
        }
    }
    /// Spin until the mutex is unlocked, acquiring afterwards.
    pub fn lock(&self) -> SpinMutexGuard<'_, T> {
        let interrupts_were_enabled = interrupt::interrupts_enabled();
        unsafe { interrupt::disable_interrupts() };

        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.locked.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
        SpinMutexGuard {
            mutex: self,
            interrupts_were_enabled,
        }
    }
    #[cfg(test)]
    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
    unsafe fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
unsafe impl<T> Sync for SpinMutex<T> where T: Send {}

/// Guards must be dropped in the reverse order they were taken,
/// or interrupts come back on while an inner lock is still held.
pub struct SpinMutexGuard<'m, T> {
    mutex: &'m SpinMutex<T>,
    interrupts_were_enabled: bool,
}
impl<'m, T> Deref for SpinMutexGuard<'m, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.mutex.inner.get() }
    }
}
impl<'m, T> DerefMut for SpinMutexGuard<'m, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.mutex.inner.get() }
    }
}
impl<'m, T> Drop for SpinMutexGuard<'m, T> {
    fn drop(&mut self) {
        unsafe {
            self.mutex.unlock();
            if self.interrupts_were_enabled {
                interrupt::enable_interrupts();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SpinMutex;
    use crate::arch::interrupt::{disable_interrupts, enable_interrupts, interrupts_enabled};
    use std::{sync::Arc, thread};

    #[test]
    fn interrupts_off_while_held() {
        let mutex = SpinMutex::new(());
        unsafe { enable_interrupts() };
        {
            let _guard = mutex.lock();
            assert!(!interrupts_enabled());
        }
        assert!(interrupts_enabled());
    }

    #[test]
    fn interrupts_stay_off_if_they_were_off() {
        let mutex = SpinMutex::new(());
        unsafe { disable_interrupts() };
        drop(mutex.lock());
        assert!(!interrupts_enabled());
    }

    #[test]
    fn nested_guards_restore_on_outermost_drop() {
        let (a, b) = (SpinMutex::new(()), SpinMutex::new(()));
        unsafe { enable_interrupts() };
        let outer = a.lock();
        let inner = b.lock();
        drop(inner);
        assert!(!interrupts_enabled());
        drop(outer);
        assert!(interrupts_enabled());
    }

    #[test]
    fn guard_releases_on_drop() {
        let mutex = SpinMutex::new(0usize);
        {
            let mut guard = mutex.lock();
            *guard += 1;
            assert!(mutex.is_locked());
        }
        assert!(!mutex.is_locked());
        assert_eq!(*mutex.lock(), 1);
    }

    #[test]
    fn serializes_increments() {
        let counter = Arc::new(SpinMutex::new(0usize));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        *counter.lock() += 1;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*counter.lock(), 40_000);
    }
}
