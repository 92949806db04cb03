pub mod lsb;

// ── Bit helpers (MSB-first per byte) ────────────────────────────────────
//
// Embed and extract share this ordering; it is part of the carrier wire
// format.

/// Convert bytes to bits, most significant bit of each byte first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for i in (0..8).rev() {
            bits.push(((b >> i) & 1) == 1);
        }
    }
    bits
}

/// Pack up to 8 bits into one byte, first bit most significant.
pub fn pack_bits(bits: &[bool]) -> u8 {
    bits.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8)
}

/// Overwrite the least significant bit of `byte`.
#[inline]
pub fn set_lsb(byte: u8, bit: bool) -> u8 {
    (byte & 0xFE) | bit as u8
}

/// Parity of `byte`: odd reads as 1, even as 0.
#[inline]
pub fn lsb(byte: u8) -> bool {
    byte & 1 == 1
}
