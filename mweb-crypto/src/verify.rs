//! MWEB header and leafset verification
//!
//! An MWEB header is only trusted if the base chain commits to it. The
//! `mwebheader` message carries the evidence:
//!
//! ```text
//! merkle block  --proves-->  HogEx tx is the last tx of the block
//! HogEx tx      --output 0-> OP_8 <BLAKE3(mweb header)>
//! ```
//!
//! [`verify_header`] runs four checks in order and stops at the first
//! failure:
//!
//! 1. the partial merkle tree recomputes to the block's merkle root
//! 2. the supplied transaction is flagged as HogEx
//! 3. the last matched transaction is the HogEx, at the final position
//! 4. the first HogEx output is the HogAddr script for the header hash
//!
//! [`verify_leafset`] checks the leafset bitmap against the header's
//! `leafset_root`.
//!
//! Every failure is returned as a typed error; the caller must reject the
//! header or leafset outright.

use crate::hash::Hash32;
use crate::merkle::{MerkleExtractor, PartialMerkleExtractor};
use crate::script::hog_addr_script;
use crate::wire::{MsgMwebHeader, MsgMwebLeafset};
use crate::{MwebError, Result};

/// Verify that an MWEB header is anchored in its base-chain block.
///
/// # Errors
///
/// `MalformedMerkleBlock`, `BadMerkleBlock`, `NotHogEx`, `TxHashMismatch`,
/// `TxIndexMismatch` or `HogAddrMismatch`, for the first check that fails.
pub fn verify_header(msg: &MsgMwebHeader) -> Result<()> {
    verify_header_with(&PartialMerkleExtractor, msg)
}

/// [`verify_header`] with a caller-supplied merkle extractor.
///
/// # Errors
///
/// As [`verify_header`], plus anything the extractor returns.
pub fn verify_header_with<E: MerkleExtractor + ?Sized>(
    extractor: &E,
    msg: &MsgMwebHeader,
) -> Result<()> {
    check_header(extractor, msg).inspect_err(|err| {
        log::warn!(
            "rejecting mweb header at height {}: {}",
            msg.mweb_header.height,
            err
        );
    })
}

fn check_header<E: MerkleExtractor + ?Sized>(extractor: &E, msg: &MsgMwebHeader) -> Result<()> {
    let extraction = extractor.extract(&msg.merkle)?;
    if extraction.root != msg.merkle.header.merkle_root {
        return Err(MwebError::BadMerkleBlock {
            computed: extraction.root,
            expected: msg.merkle.header.merkle_root,
        });
    }

    let hogex_txid = msg.hogex.txid();
    if !msg.hogex.is_hogex {
        return Err(MwebError::NotHogEx { txid: hogex_txid });
    }

    let (Some(last_match), Some(&last_index)) =
        (extraction.matches.last(), extraction.indices.last())
    else {
        return Err(MwebError::MalformedMerkleBlock("no matched transactions"));
    };
    if hogex_txid != *last_match {
        return Err(MwebError::TxHashMismatch {
            hogex: hogex_txid,
            last_match: *last_match,
        });
    }

    let final_index = msg
        .merkle
        .transactions
        .checked_sub(1)
        .ok_or(MwebError::MalformedMerkleBlock("no transactions"))?;
    if last_index != final_index {
        return Err(MwebError::TxIndexMismatch {
            got: last_index,
            expected: final_index,
        });
    }

    let header_hash = msg.mweb_header.hash();
    let expected = hog_addr_script(&header_hash);
    let actual = msg
        .hogex
        .outputs
        .first()
        .map(|out| out.pk_script.as_slice())
        .unwrap_or_default();
    if actual != expected.as_slice() {
        return Err(MwebError::HogAddrMismatch {
            actual: hex::encode(actual),
            expected: hex::encode(&expected),
        });
    }

    log::debug!(
        "mweb header {} anchored by hogex {} in block {}",
        header_hash,
        hogex_txid,
        msg.merkle.header.hash()
    );
    Ok(())
}

/// Verify that a leafset bitmap matches the header's leafset root.
///
/// # Errors
///
/// `MwebError::LeafsetRootMismatch` if `BLAKE3(leafset)` differs from
/// `header.mweb_header.leafset_root`.
pub fn verify_leafset(header: &MsgMwebHeader, leafset: &MsgMwebLeafset) -> Result<()> {
    let leafset_root = Hash32::blake3(&leafset.leafset);
    if leafset_root != header.mweb_header.leafset_root {
        let err = MwebError::LeafsetRootMismatch {
            leafset: leafset_root,
            header: header.mweb_header.leafset_root,
        };
        log::warn!("rejecting mweb leafset for block {}: {}", leafset.block_hash, err);
        return Err(err);
    }
    Ok(())
}
