//! Single-pass greedy LZF compressor.

use crate::{Error, Result, HASH_LOG, HASH_SIZE, MAX_LITERAL, MAX_OFFSET, MAX_REFERENCE};

/// Reusable LZF compressor.
///
/// Owns the match-finder hash table: one slot per hash value holding the last
/// input position that produced it. The table is cleared at the start of every
/// [`compress`](Self::compress) call, so a compressor can be reused for any
/// number of unrelated buffers. It is not shareable between concurrent calls;
/// give each worker its own instance.
#[derive(Debug, Clone)]
pub struct Compressor {
    table: Box<[usize]>,
}

impl Compressor {
    /// Create a compressor with an empty hash table.
    pub fn new() -> Self {
        Self {
            table: vec![0; HASH_SIZE].into_boxed_slice(),
        }
    }

    /// Compress `input` into `output`, returning the number of bytes written.
    ///
    /// Returns [`Error::InsufficientCapacity`] when the compressed form does
    /// not fit; in that case the contents of `output` are unspecified, but no
    /// byte past `output.len()` is ever touched. The compressor always keeps
    /// one spare byte at the end of `output`, so a result of exactly
    /// `output.len()` bytes is reported as insufficient.
    pub fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.table.fill(0);

        let in_len = input.len();
        let capacity = output.len();
        let overflow = || {
            tracing::debug!(input = in_len, capacity, "LZF output budget exhausted");
            Error::InsufficientCapacity { capacity }
        };

        let mut ip = 0usize;
        let mut op = 0usize;
        let mut lit = 0usize;

        // The running hash carries the previous byte in its top bits; only the
        // three bytes at `ip` are ever compared when accepting a match.
        let mut hval = first(input, 0);

        loop {
            if ip + 2 < in_len {
                hval = next(hval, input, ip);
                let slot = hash_slot(hval);
                let reference = self.table[slot];
                self.table[slot] = ip;

                // Slot value 0 doubles as "empty", so position 0 is never a
                // match source.
                if reference > 0
                    && ip - reference - 1 < MAX_OFFSET
                    && ip + 4 < in_len
                    && input[reference..reference + 3] == input[ip..ip + 3]
                {
                    let off = ip - reference - 1;
                    let max_len = (in_len - ip - 2).min(MAX_REFERENCE);

                    if op + lit + 1 + 3 >= capacity {
                        return Err(overflow());
                    }

                    let mut len = 3;
                    while len < max_len && input[reference + len] == input[ip + len] {
                        len += 1;
                    }

                    if lit != 0 {
                        op = flush_literals(output, op, &input[ip - lit..ip]);
                        lit = 0;
                    }

                    let wire_len = len - 2;
                    if wire_len < 7 {
                        output[op] = ((off >> 8) + (wire_len << 5)) as u8;
                        op += 1;
                    } else {
                        output[op] = ((off >> 8) + (7 << 5)) as u8;
                        output[op + 1] = (wire_len - 7) as u8;
                        op += 2;
                    }
                    output[op] = off as u8;
                    op += 1;

                    // Re-seed the last two positions of the match; at least two
                    // bytes of input always follow it.
                    ip += len - 2;
                    hval = first(input, ip);
                    hval = next(hval, input, ip);
                    self.table[hash_slot(hval)] = ip;
                    ip += 1;
                    hval = next(hval, input, ip);
                    self.table[hash_slot(hval)] = ip;
                    ip += 1;
                    continue;
                }
            } else if ip == in_len {
                break;
            }

            lit += 1;
            ip += 1;

            if lit == MAX_LITERAL {
                if op + 1 + MAX_LITERAL >= capacity {
                    return Err(overflow());
                }
                op = flush_literals(output, op, &input[ip - lit..ip]);
                lit = 0;
            }
        }

        if lit != 0 {
            if op + lit + 1 >= capacity {
                return Err(overflow());
            }
            op = flush_literals(output, op, &input[ip - lit..ip]);
        }

        Ok(op)
    }

    /// Compress `input` into a new buffer of at most `capacity` bytes.
    pub fn compress_to_vec(&mut self, input: &[u8], capacity: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; capacity];
        let len = self.compress(input, &mut output)?;
        output.truncate(len);
        Ok(output)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress `input` into `output` with a freshly allocated compressor.
///
/// Prefer a long-lived [`Compressor`] when compressing many blocks.
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    Compressor::new().compress(input, output)
}

/// Compress `input` into a new buffer of at most `capacity` bytes.
pub fn compress_to_vec(input: &[u8], capacity: usize) -> Result<Vec<u8>> {
    Compressor::new().compress_to_vec(input, capacity)
}

/// Emit one literal run. The caller has already checked capacity.
#[inline]
fn flush_literals(output: &mut [u8], op: usize, literals: &[u8]) -> usize {
    debug_assert!(!literals.is_empty() && literals.len() <= MAX_LITERAL);
    output[op] = (literals.len() - 1) as u8;
    output[op + 1..op + 1 + literals.len()].copy_from_slice(literals);
    op + 1 + literals.len()
}

#[inline]
fn first(input: &[u8], ip: usize) -> u32 {
    let b0 = input.get(ip).copied().unwrap_or(0) as u32;
    let b1 = input.get(ip + 1).copied().unwrap_or(0) as u32;
    (b0 << 8) | b1
}

#[inline]
fn next(hval: u32, input: &[u8], ip: usize) -> u32 {
    (hval << 8) | input[ip + 2] as u32
}

/// Map a running hash to a table slot.
///
/// The shift amount is itself derived from the hash and wraps modulo 32.
#[inline]
fn hash_slot(hval: u32) -> usize {
    let shift = (3 * 8 - HASH_LOG).wrapping_sub(hval.wrapping_mul(5));
    ((hval ^ (hval << 5)).wrapping_shr(shift) & (HASH_SIZE as u32 - 1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let mut output = [0u8; 4];
        assert_eq!(compress(&[], &mut output), Ok(0));
    }

    #[test]
    fn test_single_byte() {
        let mut output = [0u8; 4];
        let len = compress(b"x", &mut output).unwrap();
        assert_eq!(&output[..len], &[0x00, b'x']);
    }

    #[test]
    fn test_repeated_byte_run() {
        let input = [b'a'; 16];
        let mut output = [0u8; 64];
        let len = compress(&input, &mut output).unwrap();

        // Position 0 can never be referenced, so the first match starts at 2
        // and repeats the previous byte (offset 0) for 12 bytes.
        assert_eq!(
            &output[..len],
            &[0x01, b'a', b'a', 0xE0, 0x03, 0x00, 0x01, b'a', b'a']
        );
    }

    #[test]
    fn test_short_match_uses_two_byte_control() {
        // The repeat of "bcd" at 5 references position 1 (offset 3, length 3).
        let input = b"abcdabcdxy";
        let mut output = [0u8; 32];
        let len = compress(input, &mut output).unwrap();

        assert_eq!(
            &output[..len],
            &[0x04, b'a', b'b', b'c', b'd', b'a', 0x20, 0x03, 0x01, b'x', b'y']
        );
    }

    #[test]
    fn test_spare_byte_is_required() {
        let input = [b'a'; 16];

        let mut exact = [0u8; 9];
        assert_eq!(
            compress(&input, &mut exact),
            Err(Error::InsufficientCapacity { capacity: 9 })
        );

        let mut roomy = [0u8; 10];
        assert_eq!(compress(&input, &mut roomy), Ok(9));
    }

    #[test]
    fn test_incompressible_overflows() {
        let input: Vec<u8> = (0..=255u8).collect();
        let mut output = vec![0u8; input.len()];
        let err = compress(&input, &mut output).unwrap_err();
        assert!(err.is_insufficient_capacity());
    }

    #[test]
    fn test_literal_runs_split_at_max() {
        let input: Vec<u8> = (0..40u8).collect();
        let output = compress_to_vec(&input, 64).unwrap();

        assert_eq!(output.len(), 1 + 32 + 1 + 8);
        assert_eq!(output[0], 31);
        assert_eq!(&output[1..33], &input[..32]);
        assert_eq!(output[33], 7);
        assert_eq!(&output[34..], &input[32..]);
    }

    #[test]
    fn test_compressor_reuse_is_deterministic() {
        let a = b"the quick brown fox jumps over the quick brown dog".repeat(4);
        let b = vec![7u8; 300];

        let mut compressor = Compressor::new();
        let first_a = compressor.compress_to_vec(&a, a.len()).unwrap();
        let _ = compressor.compress_to_vec(&b, b.len()).unwrap();
        let second_a = compressor.compress_to_vec(&a, a.len()).unwrap();

        assert_eq!(first_a, second_a);
    }

    #[test]
    fn test_long_match_is_capped() {
        let input = vec![0u8; 1000];
        let output = compress_to_vec(&input, 1000).unwrap();

        // Every back-reference control byte of a long zero run is an
        // extended one with the maximum extension.
        assert_eq!(output[3], 0xE0);
        assert_eq!(output[4], (MAX_REFERENCE - 2 - 7) as u8);

        let restored = crate::decompress(&output, input.len()).unwrap();
        assert_eq!(restored, input);
    }

    #[test]
    fn test_periodic_data_roundtrips() {
        let mut input: Vec<u8> = b"WXYZ".to_vec();
        input.extend((0..MAX_OFFSET + 64).map(|i| (i % 251) as u8 ^ 0x5A));
        input.extend_from_slice(b"WXYZ");

        let output = compress_to_vec(&input, input.len() * 2).unwrap();
        let restored = crate::decompress(&output, input.len()).unwrap();
        assert_eq!(restored, input);
    }
}
