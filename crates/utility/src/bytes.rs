//! Fixed-width byte packing for compact binary records.
//!
//! GTFS identifiers are short ASCII-ish strings but are not guaranteed to be
//! pure ASCII, so packing must stay UTF-8 safe: truncation (when a value is
//! longer than the field width) only ever happens on a `char` boundary, and
//! padding is zero bytes, which can never appear inside valid UTF-8 text.

/// Packs `s` into a zero-padded, fixed-width byte array.
///
/// If `s` is longer than `N` bytes once encoded, it is truncated to the
/// largest UTF-8-safe prefix that fits.
pub fn pack_fixed<const N: usize>(s: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    let bytes = s.as_bytes();
    let mut end = bytes.len().min(N);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    buf[..end].copy_from_slice(&bytes[..end]);
    buf
}

/// Unpacks a zero-padded fixed-width byte array back into a `String`,
/// stripping trailing NUL padding.
pub fn unpack_fixed<const N: usize>(buf: &[u8; N]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(N);
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
