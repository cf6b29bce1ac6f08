//! Output script construction
//!
//! Only as much of the script language as the HogAddr needs: opcodes and
//! canonical data pushes. Nothing here executes scripts.

use crate::constants::HOG_ADDR_WITNESS_VERSION;
use crate::hash::Hash32;

/// Push an empty vector.
pub const OP_0: u8 = 0x00;
/// Next byte is the push length.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Next two bytes (LE) are the push length.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Next four bytes (LE) are the push length.
pub const OP_PUSHDATA4: u8 = 0x4e;
/// Push the number -1.
pub const OP_1NEGATE: u8 = 0x4f;
/// Push the number 1; `OP_1 + (n - 1)` pushes n for n in 1..=16.
pub const OP_1: u8 = 0x51;

/// Largest payload that can be pushed with a bare length byte.
const MAX_DIRECT_PUSH: usize = 75;

/// Small-integer opcode for `n` in 0..=16.
pub fn small_int_op(n: u8) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_1 + n - 1),
        _ => None,
    }
}

/// Incremental script builder.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    /// Start an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw opcode.
    #[must_use]
    pub fn add_op(mut self, op: u8) -> Self {
        self.script.push(op);
        self
    }

    /// Append a data push using the smallest canonical encoding.
    ///
    /// Empty data and single bytes 1..=16 or 0x81 become small-integer
    /// opcodes, as the minimal-push rule requires.
    #[must_use]
    pub fn add_data(mut self, data: &[u8]) -> Self {
        let len = data.len();
        match data {
            [] => self.script.push(OP_0),
            [b @ 1..=16] => self.script.push(OP_1 + b - 1),
            [0x81] => self.script.push(OP_1NEGATE),
            _ if len <= MAX_DIRECT_PUSH => {
                self.script.push(len as u8);
                self.script.extend_from_slice(data);
            }
            _ if len <= 0xff => {
                self.script.push(OP_PUSHDATA1);
                self.script.push(len as u8);
                self.script.extend_from_slice(data);
            }
            _ if len <= 0xffff => {
                self.script.push(OP_PUSHDATA2);
                self.script.extend_from_slice(&(len as u16).to_le_bytes());
                self.script.extend_from_slice(data);
            }
            _ => {
                self.script.push(OP_PUSHDATA4);
                self.script.extend_from_slice(&(len as u32).to_le_bytes());
                self.script.extend_from_slice(data);
            }
        }
        self
    }

    /// Finish and return the script bytes.
    pub fn into_script(self) -> Vec<u8> {
        self.script
    }
}

/// The HogAddr script for an MWEB header hash: `OP_8 <32-byte hash>`.
pub fn hog_addr_script(header_hash: &Hash32) -> Vec<u8> {
    ScriptBuilder::new()
        .add_op(OP_1 + HOG_ADDR_WITNESS_VERSION - 1)
        .add_data(header_hash.as_bytes())
        .into_script()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hog_addr_layout() {
        let hash = Hash32([0xaa; 32]);
        let script = hog_addr_script(&hash);
        assert_eq!(script.len(), 34);
        assert_eq!(script[0], 0x58);
        assert_eq!(script[1], 0x20);
        assert_eq!(&script[2..], hash.as_bytes());
    }

    #[test]
    fn test_minimal_pushes() {
        assert_eq!(ScriptBuilder::new().add_data(&[]).into_script(), vec![OP_0]);
        assert_eq!(ScriptBuilder::new().add_data(&[5]).into_script(), vec![0x55]);
        assert_eq!(ScriptBuilder::new().add_data(&[0x81]).into_script(), vec![OP_1NEGATE]);
        assert_eq!(ScriptBuilder::new().add_data(&[0]).into_script(), vec![0x01, 0x00]);
        assert_eq!(small_int_op(16), Some(0x60));
        assert_eq!(small_int_op(17), None);
    }

    #[test]
    fn test_pushdata_lengths() {
        let s = ScriptBuilder::new().add_data(&[0x11; 76]).into_script();
        assert_eq!(&s[..2], &[OP_PUSHDATA1, 76]);
        assert_eq!(s.len(), 78);

        let s = ScriptBuilder::new().add_data(&[0x11; 256]).into_script();
        assert_eq!(&s[..3], &[OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(s.len(), 259);
    }
}
