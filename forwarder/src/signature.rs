//! # Signature Recovery & Verification
//!
//! secp256k1 ECDSA with public-key recovery: given the 32-byte EIP-712
//! digest and a 65-byte `r || s || v` signature, recover the signer's
//! Ethereum address and compare it to the claimed sender. No state, no
//! side effects — a pure, bounded computation.
//!
//! Two failure shapes exist and the error type keeps them apart:
//!
//! - **Malformed** — wrong length, or components outside the curve order.
//!   The bytes were never a signature to begin with.
//! - **Wrong signer** — a perfectly valid signature from the wrong key.
//!
//! The executor treats both identically (reject), but tests exercise both
//! paths separately, because collapsing them *in here* would hide real bugs
//! behind a single undifferentiated "nope".

use alloy_primitives::{Address, Signature, B256};
use thiserror::Error;

use crate::config::SIGNATURE_LENGTH;

/// Errors during signature verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature is not 65 bytes long.
    #[error("malformed signature: expected {SIGNATURE_LENGTH} bytes, got {0}")]
    InvalidLength(usize),

    /// The signature parsed structurally but its components are out of range
    /// (bad recovery id, r/s outside the curve order) so no public key can
    /// be recovered from it.
    #[error("malformed signature: components out of range")]
    Unrecoverable,

    /// A well-formed signature that recovers to an address other than the
    /// claimed sender.
    #[error("signature recovers to {recovered}, not the claimed sender {expected}")]
    SignerMismatch {
        expected: Address,
        recovered: Address,
    },
}

/// Recovers the address that produced `signature` over `digest`.
///
/// Returns the recovered identity, or a *malformed* error if the bytes
/// cannot possibly be a recoverable secp256k1 signature. This function has
/// no opinion about who the signer *should* be — that comparison belongs
/// to [`verify_signer`] and ultimately to the executor.
pub fn recover_signer(digest: B256, signature: &[u8]) -> Result<Address, SignatureError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength(signature.len()));
    }

    let parsed =
        Signature::from_raw(signature).map_err(|_| SignatureError::Unrecoverable)?;

    parsed
        .recover_address_from_prehash(&digest)
        .map_err(|_| SignatureError::Unrecoverable)
}

/// Verifies that `signature` over `digest` was produced by `expected`.
///
/// Malformed signatures and wrong-signer signatures both fail, with
/// distinguishable error variants; callers enforcing policy should map
/// both to the same rejection.
pub fn verify_signer(
    digest: B256,
    signature: &[u8],
    expected: Address,
) -> Result<(), SignatureError> {
    let recovered = recover_signer(digest, signature)?;
    if recovered != expected {
        return Err(SignatureError::SignerMismatch {
            expected,
            recovered,
        });
    }
    Ok(())
}
