//! LZF block decompression.

use crate::{Error, Result};

/// Decompress an LZF block whose decompressed size is known.
///
/// Fails with [`Error::SizeMismatch`] if the block decodes to fewer bytes
/// than `expected_size`, and with [`Error::OutputOverflow`] if it would
/// produce more.
pub fn decompress(input: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut output = vec![0u8; expected_size];
    let written = decompress_into(input, &mut output)?;

    if written != expected_size {
        return Err(Error::SizeMismatch {
            expected: expected_size,
            actual: written,
        });
    }

    Ok(output)
}

/// Decompress an LZF block into `output`, returning the number of bytes written.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize> {
    let capacity = output.len();
    let mut ip = 0usize;
    let mut op = 0usize;

    while ip < input.len() {
        let ctrl = input[ip] as usize;
        ip += 1;

        if ctrl < 1 << 5 {
            let len = ctrl + 1;
            if ip + len > input.len() {
                return Err(Error::Truncated { offset: ip - 1 });
            }
            if op + len > capacity {
                return Err(Error::OutputOverflow { capacity });
            }

            output[op..op + len].copy_from_slice(&input[ip..ip + len]);
            ip += len;
            op += len;
        } else {
            let start = ip - 1;
            let mut len = ctrl >> 5;

            if len == 7 {
                len += *input.get(ip).ok_or(Error::Truncated { offset: start })? as usize;
                ip += 1;
            }

            let low = *input.get(ip).ok_or(Error::Truncated { offset: start })? as usize;
            ip += 1;

            let distance = ((ctrl & 0x1F) << 8) + low + 1;
            if distance > op {
                return Err(Error::BadBackReference {
                    offset: start,
                    distance,
                    position: op,
                });
            }

            len += 2;
            if op + len > capacity {
                return Err(Error::OutputOverflow { capacity });
            }

            // Source and destination overlap whenever distance < len, which is
            // how runs are encoded; copy forward one byte at a time.
            let reference = op - distance;
            for i in 0..len {
                output[op + i] = output[reference + i];
            }
            op += len;
        }
    }

    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_only() {
        let data = decompress(&[0x02, b'a', b'b', b'c'], 3).unwrap();
        assert_eq!(data, b"abc");
    }

    #[test]
    fn test_overlapping_run() {
        let block = [0x01, b'a', b'a', 0xE0, 0x03, 0x00, 0x01, b'a', b'a'];
        let data = decompress(&block, 16).unwrap();
        assert_eq!(data, [b'a'; 16]);
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(decompress(&[], 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_truncated_literal() {
        let err = decompress(&[0x04, b'a', b'b'], 5).unwrap_err();
        assert_eq!(err, Error::Truncated { offset: 0 });
    }

    #[test]
    fn test_truncated_reference() {
        let err = decompress(&[0x00, b'a', 0xE0, 0x01], 16).unwrap_err();
        assert_eq!(err, Error::Truncated { offset: 2 });
    }

    #[test]
    fn test_reference_before_start() {
        let err = decompress(&[0x00, b'a', 0x20, 0x01], 4).unwrap_err();
        assert_eq!(
            err,
            Error::BadBackReference {
                offset: 2,
                distance: 2,
                position: 1,
            }
        );
    }

    #[test]
    fn test_output_overflow() {
        let err = decompress(&[0x01, b'a', b'a', 0x20, 0x00], 4).unwrap_err();
        assert_eq!(err, Error::OutputOverflow { capacity: 4 });
    }

    #[test]
    fn test_short_output_is_size_mismatch() {
        let err = decompress(&[0x01, b'a', b'b'], 3).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 3,
                actual: 2,
            }
        );
    }
}
