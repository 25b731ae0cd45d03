//! # Forward Requests & Canonical Encoding
//!
//! The [`ForwardRequest`] struct is declared through the `sol!` macro so its
//! canonical encoding — type hash, struct hash, EIP-712 signing hash — is
//! byte-for-byte the encoding any compliant typed-data signer produces. The
//! encoder and the recovery path are designed together: what the wallet signs
//! is exactly what [`crate::signature`] recovers against.
//!
//! A request is immutable once signed: every field participates in the
//! signing hash, so flipping a single bit anywhere invalidates the signature.
//!
//! ## Wire parsing
//!
//! Relay submissions arrive as loosely-typed JSON — numeric fields show up
//! as decimal strings, hex strings, or plain numbers depending on the signing
//! client. [`ForwardRequestPayload`] is the strict boundary type: it either
//! parses exactly into a [`ForwardRequest`] or fails with a
//! [`MalformedRequest`], before any signature or nonce check gets to run.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolStruct};
use serde::Deserialize;
use thiserror::Error;

use crate::config::MAX_CALL_DATA_BYTES;
use crate::domain::SigningDomain;

sol! {
    /// The authorized-action descriptor a sender signs.
    ///
    /// Field order is consensus-critical: it defines the EIP-712 type string
    /// `ForwardRequest(address from,address to,uint256 value,uint256 gas,
    /// uint256 nonce,bytes data)` that every signing client must encode.
    #[derive(Debug, PartialEq, Eq)]
    struct ForwardRequest {
        /// Identity of the authorizing party.
        address from;
        /// Identity of the call target.
        address to;
        /// Native currency attached to the inner call, in wei.
        uint256 value;
        /// Execution budget the inner call may consume.
        uint256 gas;
        /// Replay-protection counter; must equal the sender's stored nonce.
        uint256 nonce;
        /// Opaque payload passed to the target (the encoded inner call).
        bytes data;
    }
}

impl ForwardRequest {
    /// The published EIP-712 type string, for signing clients that build
    /// their encoder from our field ordering rather than from source.
    pub fn type_string() -> String {
        Self::eip712_encode_type().into_owned()
    }

    /// The EIP-712 struct hash: `keccak256(typeHash || encoded fields)`.
    /// Depends on every request field, independent of any domain.
    pub fn struct_hash(&self) -> B256 {
        self.eip712_hash_struct()
    }

    /// The full signing digest for this request under `domain`:
    /// `keccak256("\x19\x01" || domainSeparator || structHash)`.
    ///
    /// Pure function of its inputs. This is the exact 32-byte message the
    /// sender's wallet signs and the verifier recovers against. Identical
    /// requests under different domains produce unrelated digests.
    pub fn signing_hash(&self, domain: &SigningDomain) -> B256 {
        self.eip712_signing_hash(&domain.eip712())
    }

    /// The inner call's gas budget as a `u64`, or `MalformedRequest` if the
    /// declared budget is wider than any execution environment can honor.
    pub fn gas_limit(&self) -> Result<u64, MalformedRequest> {
        u64::try_from(self.gas).map_err(|_| MalformedRequest::GasOutOfRange { max: u64::MAX })
    }
}

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// A numeric field as it appears on the wire: some clients serialize
/// `uint256` values as JSON numbers, others as decimal or 0x-hex strings.
/// Anything else is a [`MalformedRequest`].
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    /// Plain JSON number. Fits small values; large ones arrive as strings.
    Number(u64),
    /// Decimal string (`"1000"`) or 0x-prefixed hex string (`"0x3e8"`).
    Text(String),
}

/// The relay submission body's `request` object, exactly as received.
///
/// Every field is validated during [`parse`](Self::parse); nothing here is
/// trusted until it has become a typed [`ForwardRequest`].
#[derive(Clone, Debug, Deserialize)]
pub struct ForwardRequestPayload {
    pub from: String,
    pub to: String,
    pub value: Quantity,
    pub gas: Quantity,
    pub nonce: Quantity,
    pub data: String,
}

/// A request that failed structural validation, rejected strictly before any
/// signature or nonce check and before any state mutation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MalformedRequest {
    /// A field that should hold a 20-byte hex address doesn't.
    #[error("invalid address in field `{field}`: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    /// A numeric field that could not be parsed as a uint256.
    #[error("invalid integer in field `{field}`: {value:?}")]
    InvalidQuantity { field: &'static str, value: String },

    /// The declared gas budget exceeds what an execution budget can express.
    /// Overflow is a rejection, never wraparound.
    #[error("gas budget exceeds the representable maximum ({max})")]
    GasOutOfRange { max: u64 },

    /// The `data` field is not a valid 0x-prefixed hex byte string.
    #[error("invalid call data: {reason}")]
    InvalidData { reason: String },

    /// The decoded payload exceeds the calldata size cap.
    #[error("call data too large: {len} bytes (max {max})")]
    DataTooLarge { len: usize, max: usize },

    /// The signature field is not a 0x-prefixed hex byte string. Wrong
    /// *length* is not caught here — that is the verifier's problem.
    #[error("invalid signature encoding: {reason}")]
    InvalidSignatureEncoding { reason: String },
}

impl ForwardRequestPayload {
    /// Parses the wire payload into a typed [`ForwardRequest`].
    ///
    /// Rejects bad addresses, unparsable or overflowing integers, non-hex or
    /// oversized calldata. The gas budget's u64 width is re-checked by the
    /// executor; here only uint256 validity is required.
    pub fn parse(&self) -> Result<ForwardRequest, MalformedRequest> {
        let from = parse_address("from", &self.from)?;
        let to = parse_address("to", &self.to)?;
        let value = parse_quantity("value", &self.value)?;
        let gas = parse_quantity("gas", &self.gas)?;
        let nonce = parse_quantity("nonce", &self.nonce)?;
        let data = parse_call_data(&self.data)?;

        Ok(ForwardRequest {
            from,
            to,
            value,
            gas,
            nonce,
            data,
        })
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, MalformedRequest> {
    value
        .parse::<Address>()
        .map_err(|_| MalformedRequest::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

fn parse_quantity(field: &'static str, value: &Quantity) -> Result<U256, MalformedRequest> {
    match value {
        Quantity::Number(n) => Ok(U256::from(*n)),
        Quantity::Text(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
                None => U256::from_str_radix(s, 10),
            };
            parsed.map_err(|_| MalformedRequest::InvalidQuantity {
                field,
                value: s.to_string(),
            })
        }
    }
}

fn parse_call_data(value: &str) -> Result<Bytes, MalformedRequest> {
    let hex_digits = value
        .strip_prefix("0x")
        .ok_or_else(|| MalformedRequest::InvalidData {
            reason: format!("missing 0x prefix: {:?}", value),
        })?;

    let bytes = hex::decode(hex_digits).map_err(|e| MalformedRequest::InvalidData {
        reason: e.to_string(),
    })?;

    if bytes.len() > MAX_CALL_DATA_BYTES {
        return Err(MalformedRequest::DataTooLarge {
            len: bytes.len(),
            max: MAX_CALL_DATA_BYTES,
        });
    }

    Ok(Bytes::from(bytes))
}

/// Decodes the submission's `signature` field from 0x-hex into raw bytes.
///
/// Only the *encoding* is validated here. Length and component range checks
/// belong to [`crate::signature`], so that a well-encoded-but-garbage
/// signature follows the `InvalidSignature` path, not `MalformedRequest`.
pub fn decode_signature(value: &str) -> Result<Vec<u8>, MalformedRequest> {
    let hex_digits =
        value
            .strip_prefix("0x")
            .ok_or_else(|| MalformedRequest::InvalidSignatureEncoding {
                reason: "missing 0x prefix".to_string(),
            })?;

    hex::decode(hex_digits).map_err(|e| MalformedRequest::InvalidSignatureEncoding {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CHAIN_ID_LOCALNET;
    use alloy_primitives::address;

    fn test_domain() -> SigningDomain {
        SigningDomain::for_deployment(
            CHAIN_ID_LOCALNET,
            address!("00000000000000000000000000000000000000ff"),
        )
    }

    fn sample_request() -> ForwardRequest {
        ForwardRequest {
            from: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            to: address!("70997970c51812dc3a010c7d01b50e0d17dc79c8"),
            value: U256::ZERO,
            gas: U256::from(100_000u64),
            nonce: U256::ZERO,
            data: Bytes::new(),
        }
    }

    #[test]
    fn type_string_matches_published_encoding() {
        // The fixed vector every external signing client is built against.
        assert_eq!(
            ForwardRequest::type_string(),
            "ForwardRequest(address from,address to,uint256 value,uint256 gas,uint256 nonce,bytes data)"
        );
    }

    #[test]
    fn signing_hash_is_deterministic() {
        let domain = test_domain();
        let req = sample_request();
        assert_eq!(req.signing_hash(&domain), req.signing_hash(&domain));
    }

    #[test]
    fn signing_hash_depends_on_every_field() {
        let domain = test_domain();
        let base = sample_request();
        let base_hash = base.signing_hash(&domain);

        let mut tampered = sample_request();
        tampered.to = address!("000000000000000000000000000000000000dead");
        assert_ne!(tampered.signing_hash(&domain), base_hash);

        let mut tampered = sample_request();
        tampered.value = U256::from(1u64);
        assert_ne!(tampered.signing_hash(&domain), base_hash);

        let mut tampered = sample_request();
        tampered.gas = U256::from(100_001u64);
        assert_ne!(tampered.signing_hash(&domain), base_hash);

        let mut tampered = sample_request();
        tampered.nonce = U256::from(1u64);
        assert_ne!(tampered.signing_hash(&domain), base_hash);

        let mut tampered = sample_request();
        tampered.data = Bytes::from(vec![0x00]);
        assert_ne!(tampered.signing_hash(&domain), base_hash);
    }

    #[test]
    fn signing_hash_depends_on_domain() {
        let req = sample_request();
        let localnet = test_domain();
        let other_chain = SigningDomain::for_deployment(1, localnet.verifying_contract);
        let other_contract = SigningDomain::for_deployment(
            CHAIN_ID_LOCALNET,
            address!("000000000000000000000000000000000000beef"),
        );

        assert_ne!(req.signing_hash(&localnet), req.signing_hash(&other_chain));
        assert_ne!(req.signing_hash(&localnet), req.signing_hash(&other_contract));
    }

    #[test]
    fn struct_hash_is_domain_independent() {
        let req = sample_request();
        assert_eq!(req.struct_hash(), req.struct_hash());
        // The struct hash is the pre-domain half of the digest; it must not
        // change across deployments.
        let a = test_domain();
        let b = SigningDomain::for_deployment(1, a.verifying_contract);
        assert_ne!(req.signing_hash(&a), req.signing_hash(&b));
        assert_eq!(req.struct_hash(), req.struct_hash());
    }

    #[test]
    fn parse_accepts_numbers_and_strings() {
        let payload = ForwardRequestPayload {
            from: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into(),
            to: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
            value: Quantity::Text("1000000000000000000".into()),
            gas: Quantity::Number(100_000),
            nonce: Quantity::Text("0x2a".into()),
            data: "0xa9059cbb".into(),
        };

        let req = payload.parse().unwrap();
        assert_eq!(req.value, U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(req.gas, U256::from(100_000u64));
        assert_eq!(req.nonce, U256::from(42u64));
        assert_eq!(req.data.as_ref(), &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn parse_rejects_bad_address() {
        let payload = ForwardRequestPayload {
            from: "not-an-address".into(),
            to: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
            value: Quantity::Number(0),
            gas: Quantity::Number(100_000),
            nonce: Quantity::Number(0),
            data: "0x".into(),
        };
        assert!(matches!(
            payload.parse(),
            Err(MalformedRequest::InvalidAddress { field: "from", .. })
        ));
    }

    #[test]
    fn parse_rejects_bad_quantity() {
        let payload = ForwardRequestPayload {
            from: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into(),
            to: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
            value: Quantity::Text("twelve".into()),
            gas: Quantity::Number(100_000),
            nonce: Quantity::Number(0),
            data: "0x".into(),
        };
        assert!(matches!(
            payload.parse(),
            Err(MalformedRequest::InvalidQuantity { field: "value", .. })
        ));
    }

    #[test]
    fn parse_rejects_unprefixed_data() {
        let payload = ForwardRequestPayload {
            from: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into(),
            to: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
            value: Quantity::Number(0),
            gas: Quantity::Number(100_000),
            nonce: Quantity::Number(0),
            data: "a9059cbb".into(),
        };
        assert!(matches!(
            payload.parse(),
            Err(MalformedRequest::InvalidData { .. })
        ));
    }

    #[test]
    fn parse_rejects_oversized_data() {
        let huge = format!("0x{}", "00".repeat(MAX_CALL_DATA_BYTES + 1));
        let payload = ForwardRequestPayload {
            from: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into(),
            to: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
            value: Quantity::Number(0),
            gas: Quantity::Number(100_000),
            nonce: Quantity::Number(0),
            data: huge,
        };
        assert!(matches!(
            payload.parse(),
            Err(MalformedRequest::DataTooLarge { .. })
        ));
    }

    #[test]
    fn payload_deserializes_from_wire_json() {
        // The shape the reference frontend actually POSTs.
        let json = r#"{
            "from": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "to": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "value": 0,
            "gas": 100000,
            "nonce": "0",
            "data": "0x"
        }"#;
        let payload: ForwardRequestPayload = serde_json::from_str(json).unwrap();
        let req = payload.parse().unwrap();
        assert_eq!(req.nonce, U256::ZERO);
        assert!(req.data.is_empty());
    }

    #[test]
    fn gas_limit_width_check() {
        let mut req = sample_request();
        assert_eq!(req.gas_limit().unwrap(), 100_000);

        req.gas = U256::from(u64::MAX) + U256::from(1u64);
        assert!(matches!(
            req.gas_limit(),
            Err(MalformedRequest::GasOutOfRange { .. })
        ));
    }

    #[test]
    fn decode_signature_encoding_only() {
        // Valid hex of the wrong length still decodes — length is the
        // verifier's concern, not the parser's.
        assert_eq!(decode_signature("0xdeadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(decode_signature("deadbeef").is_err());
        assert!(decode_signature("0xzz").is_err());
    }
}
