//! Wire encoding of the messages the verifier consumes.
//!
//! Integers are little-endian. Vector lengths use Bitcoin's CompactSize.
//! MWEB header fields use the MSB base-128 `VARINT` encoding.
//!
//! Decoding treats every input as untrusted: truncation, non-canonical
//! lengths, counts larger than the remaining payload and trailing bytes all
//! return `MwebError::Decode`.

mod block;
mod mweb;
mod tx;

pub use block::{BlockHeader, MerkleBlock};
pub use mweb::{MsgMwebHeader, MsgMwebLeafset, MwebHeader};
pub use tx::{OutPoint, Transaction, TxIn, TxOut};

use crate::constants::MAX_WIRE_PAYLOAD;
use crate::hash::Hash32;
use crate::{MwebError, Result};

/// Types with a wire encoding.
pub trait Encodable {
    /// Append the encoding of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Encode into a fresh buffer.
    fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

/// Types that can be decoded from the wire.
pub trait Decodable: Sized {
    /// Read one value from `reader`.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` on malformed input.
    fn decode(reader: &mut Reader<'_>) -> Result<Self>;

    /// Decode a complete message, rejecting trailing bytes.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` on malformed input or leftover bytes.
    fn from_wire(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let value = Self::decode(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(MwebError::Decode("trailing bytes after message"));
        }
        Ok(value)
    }
}

/// Cursor over an input buffer.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(MwebError::Decode("unexpected end of data"));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size array.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` on truncation.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// # Errors
    ///
    /// `MwebError::Decode` on truncation.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// # Errors
    ///
    /// `MwebError::Decode` on truncation.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// `MwebError::Decode` on truncation.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// `MwebError::Decode` on truncation.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// `MwebError::Decode` on truncation.
    pub fn read_hash(&mut self) -> Result<Hash32> {
        Ok(Hash32(self.read_array()?))
    }

    /// Read a canonical CompactSize integer.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` on truncation or a non-minimal encoding.
    pub fn read_compact_size(&mut self) -> Result<u64> {
        let (value, min) = match self.read_u8()? {
            0xfd => (u64::from(u16::from_le_bytes(self.read_array()?)), 0xfd),
            0xfe => (u64::from(u32::from_le_bytes(self.read_array()?)), 0x1_0000),
            0xff => (u64::from_le_bytes(self.read_array()?), 0x1_0000_0000),
            b => return Ok(u64::from(b)),
        };
        if value < min {
            log::debug!("rejecting compact size {value}, below its {min} minimum");
            return Err(MwebError::Decode("non-canonical compact size"));
        }
        Ok(value)
    }

    /// Read a CompactSize element count, bounded by the bytes left.
    ///
    /// Every element takes at least one byte, so a count larger than the
    /// remaining payload can never be satisfied.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` if the count cannot fit in the remaining input.
    pub fn read_count(&mut self) -> Result<usize> {
        self.read_count_of(1)
    }

    /// Read a CompactSize count of elements that each encode to at least
    /// `min_size` bytes.
    ///
    /// The result is safe to pass to `Vec::with_capacity`: it never exceeds
    /// `remaining / min_size`.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` if that many elements cannot fit in the remaining
    /// input.
    pub fn read_count_of(&mut self, min_size: usize) -> Result<usize> {
        let count = self.read_compact_size()?;
        let max = self.remaining() / min_size.max(1);
        usize::try_from(count)
            .ok()
            .filter(|&c| c <= max)
            .ok_or_else(|| {
                log::debug!("rejecting element count {count}, at most {max} fit");
                MwebError::Decode("element count exceeds payload")
            })
    }

    /// Read a CompactSize-prefixed byte vector.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` on truncation or an oversized length.
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_count()?;
        if len > MAX_WIRE_PAYLOAD {
            log::debug!("rejecting {len}-byte vector, limit {MAX_WIRE_PAYLOAD}");
            return Err(MwebError::Decode("byte vector too large"));
        }
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Read an MSB base-128 `VARINT`.
    ///
    /// # Errors
    ///
    /// `MwebError::Decode` on truncation or a value above `u64::MAX`.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut n: u64 = 0;
        loop {
            let ch = self.read_u8()?;
            if n > (u64::MAX >> 7) {
                return Err(MwebError::Decode("varint too large"));
            }
            n = (n << 7) | u64::from(ch & 0x7f);
            if ch & 0x80 == 0 {
                return Ok(n);
            }
            n = n
                .checked_add(1)
                .ok_or(MwebError::Decode("varint too large"))?;
        }
    }
}

/// Append a CompactSize integer.
pub fn write_compact_size(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Append a CompactSize-prefixed byte vector.
pub fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Append an MSB base-128 `VARINT`.
///
/// Each continuation byte carries an implicit +1, so every value has
/// exactly one encoding.
pub fn write_varint(out: &mut Vec<u8>, mut n: u64) {
    let mut tmp = [0u8; 10];
    let mut len = 0;
    loop {
        tmp[len] = (n & 0x7f) as u8 | if len > 0 { 0x80 } else { 0x00 };
        if n <= 0x7f {
            break;
        }
        n = (n >> 7) - 1;
        len += 1;
    }
    out.extend(tmp[..=len].iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint(n: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, n);
        out
    }

    #[test]
    fn test_varint_known_encodings() {
        assert_eq!(varint(0), vec![0x00]);
        assert_eq!(varint(127), vec![0x7f]);
        assert_eq!(varint(128), vec![0x80, 0x00]);
        assert_eq!(varint(255), vec![0x80, 0x7f]);
        assert_eq!(varint(16511), vec![0xff, 0x7f]);
        assert_eq!(varint(16512), vec![0x80, 0x80, 0x00]);
    }

    #[test]
    fn test_varint_extremes() {
        for n in [0, 1, 0x7f, 0x80, 0x4000, u64::from(u32::MAX), u64::MAX] {
            let bytes = varint(n);
            assert_eq!(Reader::new(&bytes).read_varint().unwrap(), n);
        }
    }

    #[test]
    fn test_varint_overflow_rejected() {
        let bytes = [0xff; 11];
        assert!(Reader::new(&bytes).read_varint().is_err());
    }

    #[test]
    fn test_compact_size_canonical() {
        let mut out = Vec::new();
        write_compact_size(&mut out, 0xfd);
        assert_eq!(out, vec![0xfd, 0xfd, 0x00]);
        assert_eq!(Reader::new(&out).read_compact_size().unwrap(), 0xfd);

        // 0x10 encoded with the 3-byte form
        let bad = [0xfd, 0x10, 0x00];
        assert_eq!(
            Reader::new(&bad).read_compact_size(),
            Err(MwebError::Decode("non-canonical compact size"))
        );
    }

    #[test]
    fn test_count_bounded_by_payload() {
        let bytes = [0x05, 0x01, 0x02];
        assert!(Reader::new(&bytes).read_count().is_err());
        assert!(Reader::new(&bytes).read_var_bytes().is_err());
    }

    #[test]
    fn test_count_bounded_by_element_size() {
        // 3 elements of at least 4 bytes need 12 bytes, only 11 follow
        let mut bytes = vec![0x03];
        bytes.extend([0u8; 11]);
        assert_eq!(
            Reader::new(&bytes).read_count_of(4),
            Err(MwebError::Decode("element count exceeds payload"))
        );
        bytes.push(0);
        assert_eq!(Reader::new(&bytes).read_count_of(4), Ok(3));
    }

    #[test]
    fn test_truncated_read() {
        let mut r = Reader::new(&[0x01, 0x02]);
        assert!(r.read_u32().is_err());
    }
}
