//! # Signing Domain
//!
//! The deployment-scoped context that every signature is bound to. The domain
//! fields are hashed into the EIP-712 domain separator, which is in turn part
//! of every signing digest — so a signature produced for one deployment
//! (chain + contract address) is cryptographically useless against any other,
//! even for byte-identical request fields.
//!
//! The domain is fixed at deployment time and lives for the lifetime of the
//! forwarding endpoint. It is published to signing clients verbatim
//! (see the relayer's `/domain` endpoint): any compliant EIP-712 signer can
//! produce an acceptable signature from these four values alone.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{FORWARDER_NAME, FORWARDER_VERSION};

/// The EIP-712 signing domain for one forwarder deployment.
///
/// Two domains differing in *any* field produce different separators and
/// therefore never accept each other's signatures. This is not auxiliary
/// metadata — it is part of what is signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    /// Protocol name, e.g. `"GaslessForwarder"`.
    pub name: String,
    /// Protocol version string, e.g. `"1"`.
    pub version: String,
    /// EIP-155 chain identifier of the deployment network.
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    /// Address of the deployed forwarding contract.
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: Address,
}

impl SigningDomain {
    /// Creates a domain with explicit name and version.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Creates a domain for a standard deployment: the canonical protocol
    /// name and version from [`crate::config`], scoped to the given chain
    /// and contract address.
    pub fn for_deployment(chain_id: u64, verifying_contract: Address) -> Self {
        Self::new(FORWARDER_NAME, FORWARDER_VERSION, chain_id, verifying_contract)
    }

    /// Converts to the `alloy` domain representation used for hashing.
    ///
    /// All four fields are always present; the optional `salt` is never used
    /// by this protocol.
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain {
            name: Some(self.name.clone().into()),
            version: Some(self.version.clone().into()),
            chain_id: Some(U256::from(self.chain_id)),
            verifying_contract: Some(self.verifying_contract),
            salt: None,
        }
    }

    /// The 32-byte domain separator: `keccak256` of the encoded domain
    /// struct. Deterministic per deployment; distinct across deployments.
    pub fn separator(&self) -> B256 {
        self.eip712().hash_struct()
    }
}

impl fmt::Display for SigningDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} (chain {}, contract {})",
            self.name, self.version, self.chain_id, self.verifying_contract
        )
    }
}
