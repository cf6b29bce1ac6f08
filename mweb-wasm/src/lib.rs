//! MWEB WASM Bindings
//!
//! WebAssembly bindings for the MWEB crypto library.
//! Exposes the pure Rust functions to JavaScript/TypeScript.

use mweb_crypto::constants::PUBLIC_KEY_LEN;
use mweb_crypto::wire::Decodable;
use mweb_crypto::{
    self, BlindingFactor, Commitment, MsgMwebHeader, MsgMwebLeafset, MwebError, MwebHeader,
    PublicKey,
};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Convert MwebError to JsValue
fn to_js_error(err: MwebError) -> JsValue {
    JsValue::from_str(&format!("{}", err))
}

/// Parse a JSON array of hex strings into blinding factors
fn parse_blinds(blinds_json: &str) -> Result<Vec<BlindingFactor>, JsValue> {
    let blinds_hex: Vec<String> = serde_json::from_str(blinds_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid JSON: {}", e)))?;

    blinds_hex
        .iter()
        .map(|s| {
            let bytes = hex::decode(s).map_err(|e| JsValue::from_str(&format!("Invalid hex: {}", e)))?;
            BlindingFactor::from_slice(&bytes).map_err(to_js_error)
        })
        .collect()
}

// ============================================================================
// Pedersen Commitment Operations
// ============================================================================

/// Create a Pedersen commitment
///
/// # Arguments
///
/// * `value` - The value to commit to
/// * `blind` - Blinding factor (32 bytes)
///
/// # Returns
///
/// Commitment as a Uint8Array (33 bytes)
///
/// # Errors
///
/// Throws JavaScript error if the blind is invalid or the commitment is
/// the point at infinity
#[wasm_bindgen(js_name = pedersenCommit)]
pub fn pedersen_commit(value: u64, blind: &[u8]) -> Result<Vec<u8>, JsValue> {
    let blind = BlindingFactor::from_slice(blind).map_err(to_js_error)?;
    let commitment = mweb_crypto::commit(&blind, value).map_err(to_js_error)?;
    Ok(commitment.as_bytes().to_vec())
}

/// Create a switch commitment: a Pedersen commitment to the switched blind
///
/// # Arguments
///
/// * `value` - The value to commit to
/// * `blind` - Raw blinding factor (32 bytes)
///
/// # Returns
///
/// Commitment as a Uint8Array (33 bytes)
#[wasm_bindgen(js_name = switchCommit)]
pub fn switch_commit(value: u64, blind: &[u8]) -> Result<Vec<u8>, JsValue> {
    let blind = BlindingFactor::from_slice(blind).map_err(to_js_error)?;
    let commitment = mweb_crypto::switch_commit(&blind, value).map_err(to_js_error)?;
    Ok(commitment.as_bytes().to_vec())
}

/// Add two commitments
///
/// # Returns
///
/// Sum commitment as a Uint8Array (33 bytes)
#[wasm_bindgen(js_name = commitmentAdd)]
pub fn commitment_add(a: &[u8], b: &[u8]) -> Result<Vec<u8>, JsValue> {
    let a = Commitment::from_slice(a).map_err(to_js_error)?;
    let b = Commitment::from_slice(b).map_err(to_js_error)?;
    let sum = a.add(&b).map_err(to_js_error)?;
    Ok(sum.as_bytes().to_vec())
}

/// Subtract commitment `b` from commitment `a`
#[wasm_bindgen(js_name = commitmentSub)]
pub fn commitment_sub(a: &[u8], b: &[u8]) -> Result<Vec<u8>, JsValue> {
    let a = Commitment::from_slice(a).map_err(to_js_error)?;
    let b = Commitment::from_slice(b).map_err(to_js_error)?;
    let diff = a.sub(&b).map_err(to_js_error)?;
    Ok(diff.as_bytes().to_vec())
}

/// Reinterpret a commitment as a compressed SEC1 public key (33 bytes)
#[wasm_bindgen(js_name = commitmentToPubkey)]
pub fn commitment_to_pubkey(commitment: &[u8]) -> Result<Vec<u8>, JsValue> {
    let commitment = Commitment::from_slice(commitment).map_err(to_js_error)?;
    let pk = commitment.to_public_key().map_err(to_js_error)?;
    Ok(pk.to_bytes().to_vec())
}

/// Reinterpret a compressed SEC1 public key as a commitment (33 bytes)
#[wasm_bindgen(js_name = pubkeyToCommitment)]
pub fn pubkey_to_commitment(pubkey: &[u8]) -> Result<Vec<u8>, JsValue> {
    let bytes: [u8; PUBLIC_KEY_LEN] = pubkey
        .try_into()
        .map_err(|_| to_js_error(MwebError::InvalidPublicKey))?;
    let pk = PublicKey::from_bytes(&bytes).map_err(to_js_error)?;
    let commitment = Commitment::from_public_key(&pk).map_err(to_js_error)?;
    Ok(commitment.as_bytes().to_vec())
}

/// Sum blinding factors for balance proof
///
/// # Arguments
///
/// * `blinds` - Array of blinding factors (as JSON array of hex strings)
/// * `n_positive` - Number of positive blinds
///
/// # Returns
///
/// Resulting blind as a Uint8Array (32 bytes)
#[wasm_bindgen(js_name = pedersenBlindSum)]
pub fn pedersen_blind_sum(blinds_json: &str, n_positive: usize) -> Result<Vec<u8>, JsValue> {
    let blinds = parse_blinds(blinds_json)?;
    if n_positive > blinds.len() {
        return Err(JsValue::from_str("n_positive exceeds number of blinds"));
    }
    let (positive, negative) = blinds.split_at(n_positive);
    Ok(mweb_crypto::blind_sum(positive, negative).to_bytes().to_vec())
}

// ============================================================================
// Extension Block Verification
// ============================================================================

/// Verify a wire-encoded `mwebheader` message
///
/// # Returns
///
/// JSON object with { height, headerHash } on success
///
/// # Errors
///
/// Throws JavaScript error describing the first failed check
#[wasm_bindgen(js_name = verifyHeader)]
pub fn verify_header(msg: &[u8]) -> Result<String, JsValue> {
    let msg = MsgMwebHeader::from_wire(msg).map_err(to_js_error)?;
    mweb_crypto::verify_header(&msg).map_err(to_js_error)?;

    let json = serde_json::json!({
        "height": msg.mweb_header.height,
        "headerHash": msg.mweb_header.hash().to_string(),
    });

    Ok(json.to_string())
}

/// Verify a wire-encoded `mwebleafset` message against its header message
///
/// Both messages are wire encoded; the header is not re-verified here.
#[wasm_bindgen(js_name = verifyLeafset)]
pub fn verify_leafset(header_msg: &[u8], leafset_msg: &[u8]) -> Result<(), JsValue> {
    let header = MsgMwebHeader::from_wire(header_msg).map_err(to_js_error)?;
    let leafset = MsgMwebLeafset::from_wire(leafset_msg).map_err(to_js_error)?;
    mweb_crypto::verify_leafset(&header, &leafset).map_err(to_js_error)
}

/// Hash a wire-encoded MWEB header
///
/// # Returns
///
/// BLAKE3 header hash as a Uint8Array (32 bytes)
#[wasm_bindgen(js_name = mwebHeaderHash)]
pub fn mweb_header_hash(header: &[u8]) -> Result<Vec<u8>, JsValue> {
    let header = MwebHeader::from_wire(header).map_err(to_js_error)?;
    Ok(header.hash().as_bytes().to_vec())
}
