pub mod kalloc;
pub mod layout;

/// Set `max_bytes` bytes starting at `dst` to `data`.
///
/// # Safety
///
/// `dst` must be valid for writes of `max_bytes` bytes.
pub unsafe fn memset(dst: *mut u8, data: u8, max_bytes: usize) -> *mut u8 {
    dst.write_bytes(data, max_bytes);
    dst
}

#[cfg(test)]
mod tests {
    use super::memset;

    #[test]
    fn memset_fills_exactly_the_range() {
        let mut buf = [0u8; 16];
        unsafe {
            memset(buf.as_mut_ptr().add(4), 0xab, 8);
        }
        assert_eq!(&buf[..4], &[0; 4]);
        assert!(buf[4..12].iter().all(|&b| b == 0xab));
        assert_eq!(&buf[12..], &[0; 4]);
    }
}
