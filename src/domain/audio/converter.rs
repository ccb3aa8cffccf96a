//! Little-endian 16-bit PCM to native sample conversion

use crate::domain::error::SampleFormatError;

/// Size of one 16-bit PCM sample in bytes
pub const BYTES_PER_SAMPLE: usize = 2;

/// Convert little-endian 16-bit PCM bytes into `i32` samples.
///
/// Each sample is rebuilt from its byte pair as
/// `(sign_extend(hi) << 8) | lo`, so the result never depends on the
/// host's native byte order. Interleaving is preserved as-is.
///
/// `out` must have room for at least `bytes.len() / 2` samples. Returns the
/// number of samples written.
pub fn convert_le16(bytes: &[u8], out: &mut [i32]) -> Result<usize, SampleFormatError> {
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(SampleFormatError::OddLength { len: bytes.len() });
    }

    let count = bytes.len() / BYTES_PER_SAMPLE;
    if out.len() < count {
        return Err(SampleFormatError::BufferTooSmall {
            needed: count,
            available: out.len(),
        });
    }

    for (dst, pair) in out.iter_mut().zip(bytes.chunks_exact(BYTES_PER_SAMPLE)) {
        let lo = i32::from(pair[0]);
        let hi = i32::from(pair[1] as i8);
        *dst = (hi << 8) | lo;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(bytes: &[u8]) -> Vec<i32> {
        let mut out = vec![0i32; bytes.len() / 2];
        let n = convert_le16(bytes, &mut out).unwrap();
        out.truncate(n);
        out
    }

    #[test]
    fn converts_known_values() {
        let bytes = [
            0x00, 0x00, // 0
            0x01, 0x00, // 1
            0xFF, 0xFF, // -1
            0xFF, 0x7F, // i16::MAX
            0x00, 0x80, // i16::MIN
            0x34, 0x12, // 0x1234
            0xCC, 0xED, // -0x1234
        ];
        assert_eq!(
            convert(&bytes),
            vec![0, 1, -1, 32767, -32768, 0x1234, -0x1234]
        );
    }

    #[test]
    fn independent_of_host_byte_order() {
        let samples: Vec<i16> = vec![0, 1, -1, 255, -256, 12345, -12345, i16::MAX, i16::MIN];

        // Little-endian host view: bytes as they arrive on the wire
        let le: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        // Big-endian host view: the same wire bytes reinterpreted by swapping each pair
        let be_reassembled: Vec<i32> = le
            .chunks_exact(2)
            .map(|p| i32::from(i16::from_be_bytes([p[1], p[0]])))
            .collect();

        let converted = convert(&le);
        assert_eq!(converted, be_reassembled);
        assert_eq!(
            converted,
            samples.iter().map(|&s| i32::from(s)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn exhaustive_byte_pairs() {
        for hi in 0..=255u8 {
            for lo in 0..=255u8 {
                let got = convert(&[lo, hi])[0];
                assert_eq!(got, i32::from(i16::from_le_bytes([lo, hi])));
            }
        }
    }

    #[test]
    fn odd_length_is_rejected() {
        let mut out = [0i32; 4];
        for len in [1usize, 3, 5, 7] {
            let bytes = vec![0u8; len];
            assert_eq!(
                convert_le16(&bytes, &mut out),
                Err(SampleFormatError::OddLength { len })
            );
        }
    }

    #[test]
    fn short_output_buffer_is_rejected() {
        let mut out = [0i32; 1];
        let err = convert_le16(&[0, 0, 0, 0], &mut out).unwrap_err();
        assert_eq!(
            err,
            SampleFormatError::BufferTooSmall {
                needed: 2,
                available: 1
            }
        );
    }

    #[test]
    fn empty_input_writes_nothing() {
        let mut out = [7i32; 2];
        assert_eq!(convert_le16(&[], &mut out), Ok(0));
        assert_eq!(out, [7, 7]);
    }

    #[test]
    fn larger_output_buffer_keeps_tail() {
        let mut out = [9i32; 4];
        assert_eq!(convert_le16(&[0x02, 0x00], &mut out), Ok(1));
        assert_eq!(out, [2, 9, 9, 9]);
    }
}
