pub mod spinmutex;

pub use spinmutex::{SpinMutex, SpinMutexGuard};
