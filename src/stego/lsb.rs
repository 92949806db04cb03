use log::debug;

use crate::config::CarrierLayout;
use crate::error::{Result, StegoError};
use crate::stego::{bytes_to_bits, lsb, pack_bits, set_lsb};

/// Zero LSBs written after the payload to mark its end.
pub const TERMINATOR_BITS: usize = 8;

/// Least-significant-bit embedding into raw carrier bytes.
///
/// Encoding model:
/// - The first `layout.header_len` bytes belong to the carrier format and
///   are never read or written.
/// - Each following carrier byte holds one payload bit in its LSB, payload
///   bytes MSB first.
/// - Eight zero bits follow the payload; a zero byte therefore ends the
///   message and cannot appear inside it.
///
/// Capacity is one bit per carrier byte after the header. The terminator is
/// written only as far as the carrier allows: a payload that fills the
/// carrier exactly ends at the buffer edge instead.
pub fn embed(carrier: &mut [u8], payload: &[u8], layout: &CarrierLayout) -> Result<()> {
    let available_bits = capacity_bits(carrier.len(), layout);
    let needed_bits = payload.len().saturating_mul(8);
    if needed_bits > available_bits {
        return Err(StegoError::Capacity {
            needed_bits,
            available_bits,
        });
    }

    let Some(region) = carrier.get_mut(layout.header_len..) else {
        // Empty payload into a carrier that is all header: nothing to write.
        return Ok(());
    };

    let bits = bytes_to_bits(payload);
    for (byte, &bit) in region.iter_mut().zip(&bits) {
        *byte = set_lsb(*byte, bit);
    }

    let mut terminator_written = 0usize;
    for byte in region.iter_mut().skip(bits.len()).take(TERMINATOR_BITS) {
        *byte = set_lsb(*byte, false);
        terminator_written += 1;
    }

    debug!(
        "embedded {} payload bytes at offset {} ({} terminator bits)",
        payload.len(),
        layout.header_len,
        terminator_written
    );
    Ok(())
}

/// How an extraction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// A zero byte was read.
    Terminator,
    /// The carrier ran out before a zero byte was seen.
    Exhausted,
}

/// Extract bytes embedded by [`embed`].
///
/// Reads one byte per 8 carrier bytes until a zero byte or the end of the
/// buffer. Running out of carrier is not an error: whatever was read so far
/// is returned.
pub fn extract(carrier: &[u8], layout: &CarrierLayout) -> Vec<u8> {
    extract_with_ending(carrier, layout).0
}

/// [`extract`], also reporting whether a terminator was found.
pub fn extract_with_ending(carrier: &[u8], layout: &CarrierLayout) -> (Vec<u8>, Ending) {
    let region = carrier.get(layout.header_len..).unwrap_or_default();
    let mut out = Vec::new();
    let mut bits = [false; 8];

    for group in region.chunks_exact(8) {
        for (bit, &byte) in bits.iter_mut().zip(group) {
            *bit = lsb(byte);
        }
        let b = pack_bits(&bits);
        if b == 0 {
            return (out, Ending::Terminator);
        }
        out.push(b);
    }

    debug!(
        "carrier exhausted after {} bytes without a terminator",
        out.len()
    );
    (out, Ending::Exhausted)
}

/// Payload bits the carrier can hold after its header.
pub fn capacity_bits(carrier_len: usize, layout: &CarrierLayout) -> usize {
    carrier_len.saturating_sub(layout.header_len)
}

/// Whole payload bytes the carrier can hold after its header.
pub fn capacity(carrier_len: usize, layout: &CarrierLayout) -> usize {
    capacity_bits(carrier_len, layout) / 8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> CarrierLayout {
        CarrierLayout::bmp()
    }

    /// Carrier with varied byte values so LSB changes are visible.
    fn noisy_carrier(len: usize) -> Vec<u8> {
        let mut state: u32 = 0x1234_5678;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    }

    #[test]
    fn roundtrip_nonzero_payload() {
        let payload: Vec<u8> = (1..=255).collect();
        let mut carrier = noisy_carrier(54 + 255 * 8 + 8);
        embed(&mut carrier, &payload, &layout()).unwrap();
        let (out, ending) = extract_with_ending(&carrier, &layout());
        assert_eq!(out, payload);
        assert_eq!(ending, Ending::Terminator);
    }

    #[test]
    fn terminator_stops_after_single_byte() {
        let mut carrier = vec![0xFFu8; 1000];
        embed(&mut carrier, &[0x41], &layout()).unwrap();
        assert_eq!(extract(&carrier, &layout()), vec![0x41]);
        // 0x41 = 0100_0001, then eight zero bits.
        let lsbs: Vec<u8> = carrier[54..70].iter().map(|b| b & 1).collect();
        assert_eq!(lsbs, [0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
        // Past the terminator the carrier is untouched.
        assert!(carrier[70..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn capacity_boundary() {
        let len = 54 + 80;
        let exact = vec![0x5Au8; 10];

        let mut carrier = noisy_carrier(len);
        embed(&mut carrier, &exact, &layout()).expect("exact fit should succeed");
        let (out, ending) = extract_with_ending(&carrier, &layout());
        assert_eq!(out, exact);
        assert_eq!(ending, Ending::Exhausted);

        let mut carrier = noisy_carrier(len);
        let before = carrier.clone();
        let err = embed(&mut carrier, &[0x5Au8; 11], &layout()).unwrap_err();
        assert!(matches!(
            err,
            StegoError::Capacity {
                needed_bits: 88,
                available_bits: 80
            }
        ));
        assert_eq!(carrier, before, "failed embed must not mutate the carrier");
    }

    #[test]
    fn only_lsbs_in_payload_region_change() {
        let payload = b"fidelity";
        let orig = noisy_carrier(4096);
        let mut carrier = orig.clone();
        embed(&mut carrier, payload, &layout()).unwrap();

        let touched = 54 + payload.len() * 8 + TERMINATOR_BITS;
        for (i, (a, b)) in orig.iter().zip(&carrier).enumerate() {
            if i < 54 || i >= touched {
                assert_eq!(a, b, "byte {i} outside payload region changed");
            } else {
                assert_eq!(a & 0xFE, b & 0xFE, "byte {i} changed above the LSB");
            }
        }
        assert_eq!(carrier.len(), orig.len());
    }

    #[test]
    fn truncated_carrier_returns_prefix() {
        let mut carrier = noisy_carrier(2000);
        embed(&mut carrier, b"truncate me", &layout()).unwrap();
        // Keep 4 full bytes plus a partial group.
        let cut = &carrier[..54 + 4 * 8 + 5];
        let (out, ending) = extract_with_ending(cut, &layout());
        assert_eq!(out, b"trun");
        assert_eq!(ending, Ending::Exhausted);
    }

    #[test]
    fn carrier_shorter_than_header() {
        let mut tiny = vec![1u8; 10];
        assert!(extract(&tiny, &layout()).is_empty());
        assert!(embed(&mut tiny, b"", &layout()).is_ok());
        assert!(matches!(
            embed(&mut tiny, b"x", &layout()),
            Err(StegoError::Capacity { available_bits: 0, .. })
        ));
        assert_eq!(capacity(10, &layout()), 0);
    }

    #[test]
    fn empty_payload_writes_only_terminator() {
        let mut carrier = vec![0xFFu8; 100];
        embed(&mut carrier, b"", &layout()).unwrap();
        assert!(carrier[54..62].iter().all(|&b| b == 0xFE));
        assert!(carrier[62..].iter().all(|&b| b == 0xFF));
        assert_eq!(extract_with_ending(&carrier, &layout()), (vec![], Ending::Terminator));
    }

    #[test]
    fn header_is_never_touched() {
        let mut carrier = vec![0xFFu8; 500];
        embed(&mut carrier, &[0x00, 0x00], &layout()).unwrap();
        assert!(carrier[..54].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn custom_header_len() {
        let custom = CarrierLayout::with_header_len(3);
        let mut carrier = vec![0u8; 3 + 16 + 8];
        embed(&mut carrier, b"ok", &custom).unwrap();
        assert_eq!(extract(&carrier, &custom), b"ok");
        assert_eq!(capacity(carrier.len(), &custom), 3);
    }
}
