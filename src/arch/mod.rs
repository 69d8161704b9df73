pub mod riscv;

pub use riscv::{interrupt, is_page_aligned, pg_round_up, PAGE_SHIFT, PAGE_SIZE};
