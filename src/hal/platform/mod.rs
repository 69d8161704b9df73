#[cfg(feature = "milk-v")]
mod milk_v;
#[cfg(feature = "milk-v")]
pub use milk_v::*;
#[cfg(all(feature = "qemu-riscv64", not(feature = "milk-v")))]
mod qemu_riscv64;
#[cfg(all(feature = "qemu-riscv64", not(feature = "milk-v")))]
pub use qemu_riscv64::*;

#[cfg(not(any(feature = "milk-v", feature = "qemu-riscv64")))]
compile_error!("a platform must be selected");
