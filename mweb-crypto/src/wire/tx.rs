//! Base-chain transactions, including the HogEx marker transaction.
//!
//! ```text
//! version   i32
//! [0x00 flags]            only when flags != 0
//! inputs    CompactSize count, then each input
//! outputs   CompactSize count, then each output
//! [witness]               when flags & 0x01
//! [mweb tx] optional ptr  when flags & 0x08; a null pointer marks HogEx
//! lock_time u32
//! ```
//!
//! The txid covers only version, inputs, outputs and lock time.

use super::{write_compact_size, write_var_bytes, Decodable, Encodable, Reader};
use crate::hash::Hash32;
use crate::{MwebError, Result};

const WITNESS_FLAG: u8 = 0x01;
const MWEB_FLAG: u8 = 0x08;

/// Smallest input encoding: outpoint, empty script, sequence.
const MIN_INPUT_SIZE: usize = 32 + 4 + 1 + 4;
/// Smallest output encoding: value, empty script.
const MIN_OUTPUT_SIZE: usize = 8 + 1;

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutPoint {
    /// Hash of the funding transaction
    pub hash: Hash32,
    /// Output index within it
    pub index: u32,
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxIn {
    /// Output being spent
    pub previous_output: OutPoint,
    /// Unlocking script
    pub signature_script: Vec<u8>,
    /// Sequence number
    pub sequence: u32,
    /// Segregated witness stack
    pub witness: Vec<Vec<u8>>,
}

/// Transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxOut {
    /// Amount in base units
    pub value: i64,
    /// Locking script
    pub pk_script: Vec<u8>,
}

/// A base-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    /// Transaction version
    pub version: i32,
    /// Inputs
    pub inputs: Vec<TxIn>,
    /// Outputs
    pub outputs: Vec<TxOut>,
    /// Lock time
    pub lock_time: u32,
    /// Whether this is the HogEx (integrating) transaction of its block
    pub is_hogex: bool,
}

impl Transaction {
    fn has_witness(&self) -> bool {
        self.inputs.iter().any(|i| !i.witness.is_empty())
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.has_witness() {
            flags |= WITNESS_FLAG;
        }
        if self.is_hogex {
            flags |= MWEB_FLAG;
        }
        flags
    }

    fn encode_body(&self, out: &mut Vec<u8>) {
        write_compact_size(out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(input.previous_output.hash.as_bytes());
            out.extend_from_slice(&input.previous_output.index.to_le_bytes());
            write_var_bytes(out, &input.signature_script);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_compact_size(out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(out, &output.pk_script);
        }
    }

    /// Transaction id: SHA256d of the encoding without witness or MWEB data.
    pub fn txid(&self) -> Hash32 {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        self.encode_body(&mut out);
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        Hash32::sha256d(&out)
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_le_bytes());
        let flags = self.flags();
        if flags != 0 {
            out.push(0x00);
            out.push(flags);
        }
        self.encode_body(out);
        if flags & WITNESS_FLAG != 0 {
            for input in &self.inputs {
                write_compact_size(out, input.witness.len() as u64);
                for item in &input.witness {
                    write_var_bytes(out, item);
                }
            }
        }
        if flags & MWEB_FLAG != 0 {
            // null MWEB transaction
            out.push(0x00);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
    }
}

impl Decodable for Transaction {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let version = r.read_i32()?;

        let mut flags = 0u8;
        let mut input_count = r.read_count_of(MIN_INPUT_SIZE)?;
        if input_count == 0 {
            flags = r.read_u8()?;
            if flags == 0 {
                return Err(MwebError::Decode("zero transaction flags"));
            }
            if flags & !(WITNESS_FLAG | MWEB_FLAG) != 0 {
                return Err(MwebError::Decode("unknown transaction flags"));
            }
            input_count = r.read_count_of(MIN_INPUT_SIZE)?;
        }

        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxIn {
                previous_output: OutPoint {
                    hash: r.read_hash()?,
                    index: r.read_u32()?,
                },
                signature_script: r.read_var_bytes()?,
                sequence: r.read_u32()?,
                witness: Vec::new(),
            });
        }

        let output_count = r.read_count_of(MIN_OUTPUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOut {
                value: r.read_i64()?,
                pk_script: r.read_var_bytes()?,
            });
        }

        if flags & WITNESS_FLAG != 0 {
            for input in &mut inputs {
                let items = r.read_count()?;
                input.witness = (0..items)
                    .map(|_| r.read_var_bytes())
                    .collect::<Result<Vec<_>>>()?;
            }
        }

        let mut is_hogex = false;
        if flags & MWEB_FLAG != 0 {
            if r.read_u8()? != 0 {
                return Err(MwebError::Decode("mweb transaction bodies are not supported"));
            }
            if outputs.is_empty() {
                return Err(MwebError::Decode("hogex transaction without outputs"));
            }
            is_hogex = true;
        }

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time: r.read_u32()?,
            is_hogex,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(is_hogex: bool) -> Transaction {
        Transaction {
            version: 2,
            inputs: vec![TxIn {
                previous_output: OutPoint {
                    hash: Hash32([0x11; 32]),
                    index: 0,
                },
                signature_script: vec![],
                sequence: 0xffff_ffff,
                witness: vec![],
            }],
            outputs: vec![TxOut {
                value: 5_000,
                pk_script: vec![0x58, 0x20],
            }],
            lock_time: 0,
            is_hogex,
        }
    }

    #[test]
    fn test_hogex_wire() {
        let tx = sample(true);
        let bytes = tx.to_wire();
        assert_eq!(&bytes[4..6], &[0x00, 0x08]);
        assert_eq!(Transaction::from_wire(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_txid_ignores_hogex_flag() {
        assert_eq!(sample(true).txid(), sample(false).txid());
        assert_ne!(sample(true).to_wire(), sample(false).to_wire());
    }

    #[test]
    fn test_witness_wire() {
        let mut tx = sample(false);
        tx.inputs[0].witness = vec![vec![0xaa; 3], vec![]];
        let bytes = tx.to_wire();
        assert_eq!(&bytes[4..6], &[0x00, 0x01]);
        let decoded = Transaction::from_wire(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.txid(), sample(false).txid());
    }

    #[test]
    fn test_mweb_body_rejected() {
        let mut bytes = sample(true).to_wire();
        // the null-pointer byte sits just before the 4-byte lock time
        let at = bytes.len() - 5;
        bytes[at] = 0x01;
        assert_eq!(
            Transaction::from_wire(&bytes),
            Err(MwebError::Decode("mweb transaction bodies are not supported"))
        );
    }

    #[test]
    fn test_input_count_bounded_by_input_size() {
        // version, then 0x0040_0000 inputs declared with 4 KiB behind them
        let mut bytes = 2i32.to_le_bytes().to_vec();
        write_compact_size(&mut bytes, 0x0040_0000);
        bytes.extend(vec![0u8; 4096]);
        assert_eq!(
            Transaction::from_wire(&bytes),
            Err(MwebError::Decode("element count exceeds payload"))
        );

        // 10 inputs fit in 400 bytes only if each took under 41
        let mut bytes = 2i32.to_le_bytes().to_vec();
        write_compact_size(&mut bytes, 10);
        bytes.extend(vec![0u8; 400]);
        assert_eq!(
            Transaction::from_wire(&bytes),
            Err(MwebError::Decode("element count exceeds payload"))
        );
    }

    #[test]
    fn test_output_count_bounded_by_output_size() {
        let mut bytes = sample(false).to_wire();
        // drop the single output and the lock time, then claim 5 outputs
        // over 40 bytes
        let outputs_at = 4 + 1 + MIN_INPUT_SIZE;
        bytes.truncate(outputs_at);
        write_compact_size(&mut bytes, 5);
        bytes.extend(vec![0u8; 40]);
        assert_eq!(
            Transaction::from_wire(&bytes),
            Err(MwebError::Decode("element count exceeds payload"))
        );
    }

    #[test]
    fn test_unknown_flags_rejected() {
        let mut bytes = sample(true).to_wire();
        bytes[5] = 0x02;
        assert!(Transaction::from_wire(&bytes).is_err());
    }
}
