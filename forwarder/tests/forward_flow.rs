//! End-to-end tests for the forwarding protocol.
//!
//! These exercise the full path a real submission takes: a wallet signs a
//! typed request off-path, the loosely-typed wire payload is parsed at the
//! boundary, and the executor verifies, consumes the nonce, and runs the
//! inner call. Each test builds its own forwarder; no shared state, no
//! ordering dependencies.

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use gasless_forwarder::config::CHAIN_ID_LOCALNET;
use gasless_forwarder::request::{decode_signature, Quantity};
use gasless_forwarder::{
    CallOutcome, ForwardError, ForwardRequest, ForwardRequestPayload, Forwarder, SigningDomain,
};

const FORWARDER_CONTRACT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
const TARGET: Address = address!("000000000000000000000000000000000000cafe");

// The first default Hardhat dev account — a known key/address pair, useful
// as a fixed vector for the whole sign-and-recover pipeline.
const HARDHAT_KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const HARDHAT_ADDR_0: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

fn deployment() -> Forwarder {
    Forwarder::new(SigningDomain::for_deployment(
        CHAIN_ID_LOCALNET,
        FORWARDER_CONTRACT,
    ))
}

fn build_request(from: Address, nonce: u64) -> ForwardRequest {
    ForwardRequest {
        from,
        to: TARGET,
        value: U256::ZERO,
        gas: U256::from(100_000u64),
        nonce: U256::from(nonce),
        data: Bytes::new(),
    }
}

fn sign_request(signer: &PrivateKeySigner, fwd: &Forwarder, req: &ForwardRequest) -> Vec<u8> {
    signer
        .sign_hash_sync(&req.signing_hash(fwd.domain()))
        .expect("signing cannot fail")
        .as_bytes()
        .to_vec()
}

fn accepting_target() -> impl gasless_forwarder::CallTarget {
    |_to: Address, _value: U256, _gas: u64, _data: &[u8]| CallOutcome::success(Bytes::new())
}

#[test]
fn hardhat_dev_key_recovers_to_its_known_address() {
    // Fixed vector: the signer derived from the well-known dev key must
    // report the well-known dev address, and a request signed with it must
    // forward successfully when `from` claims that address.
    let signer: PrivateKeySigner = HARDHAT_KEY_0.parse().expect("valid dev key");
    assert_eq!(signer.address(), HARDHAT_ADDR_0);

    let fwd = deployment();
    let req = build_request(HARDHAT_ADDR_0, 0);
    let sig = sign_request(&signer, &fwd, &req);

    assert!(fwd.forward(&accepting_target(), &req, &sig).is_ok());
}

#[test]
fn forward_then_replay_is_rejected() {
    // Sender S with stored nonce 0 signs {from:S, to:T, value:0, gas:100000,
    // nonce:0, data:0x}. Forward succeeds, nonce becomes 1, the record shows
    // nonce=0 success=true. Resubmitting the identical pair fails with an
    // invalid nonce and the counter stays at 1.
    let fwd = deployment();
    let signer = PrivateKeySigner::random();
    let req = build_request(signer.address(), 0);
    let sig = sign_request(&signer, &fwd, &req);

    let outcome = fwd.forward(&accepting_target(), &req, &sig).unwrap();
    assert!(outcome.success);
    assert_eq!(fwd.nonce_of(signer.address()), 1);

    let records = fwd.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].nonce, U256::ZERO);
    assert!(records[0].success);

    let err = fwd.forward(&accepting_target(), &req, &sig).unwrap_err();
    assert!(matches!(err, ForwardError::InvalidNonce { .. }));
    assert_eq!(fwd.nonce_of(signer.address()), 1);
    assert_eq!(fwd.records().len(), 1);
}

#[test]
fn attacker_replays_after_sender_moved_on() {
    // S signs nonce 0 but never submits it; S separately advances to nonce 1
    // via another request; an attacker then submits the stale authorization.
    let fwd = deployment();
    let signer = PrivateKeySigner::random();

    let stale = build_request(signer.address(), 0);
    let stale_sig = sign_request(&signer, &fwd, &stale);

    let mut current = build_request(signer.address(), 0);
    current.data = Bytes::from(vec![0x01]);
    let current_sig = sign_request(&signer, &fwd, &current);
    fwd.forward(&accepting_target(), &current, &current_sig)
        .unwrap();
    assert_eq!(fwd.nonce_of(signer.address()), 1);

    let err = fwd
        .forward(&accepting_target(), &stale, &stale_sig)
        .unwrap_err();
    assert!(matches!(err, ForwardError::InvalidNonce { .. }));
    assert_eq!(fwd.nonce_of(signer.address()), 1);
}

#[test]
fn every_tampered_field_invalidates_the_signature() {
    let fwd = deployment();
    let signer = PrivateKeySigner::random();
    let req = build_request(signer.address(), 0);
    let sig = sign_request(&signer, &fwd, &req);

    let tampers: Vec<ForwardRequest> = vec![
        ForwardRequest {
            to: address!("000000000000000000000000000000000000dead"),
            ..req.clone()
        },
        ForwardRequest {
            value: U256::from(1u64),
            ..req.clone()
        },
        ForwardRequest {
            gas: U256::from(200_000u64),
            ..req.clone()
        },
        ForwardRequest {
            data: Bytes::from(vec![0xff]),
            ..req.clone()
        },
    ];

    for tampered in tampers {
        let err = fwd.forward(&accepting_target(), &tampered, &sig).unwrap_err();
        assert!(
            matches!(err, ForwardError::InvalidSignature { .. }),
            "tampered request must fail signature verification"
        );
    }
    assert_eq!(fwd.nonce_of(signer.address()), 0);
}

#[test]
fn deployments_on_different_chains_reject_each_other() {
    let localnet = deployment();
    let sepolia = Forwarder::new(SigningDomain::for_deployment(
        gasless_forwarder::config::CHAIN_ID_SEPOLIA,
        FORWARDER_CONTRACT,
    ));

    let signer = PrivateKeySigner::random();
    let req = build_request(signer.address(), 0);

    let local_sig = sign_request(&signer, &localnet, &req);
    let err = sepolia
        .forward(&accepting_target(), &req, &local_sig)
        .unwrap_err();
    assert!(matches!(err, ForwardError::InvalidSignature { .. }));

    let sepolia_sig = sign_request(&signer, &sepolia, &req);
    let err = localnet
        .forward(&accepting_target(), &req, &sepolia_sig)
        .unwrap_err();
    assert!(matches!(err, ForwardError::InvalidSignature { .. }));
}

#[test]
fn wire_payload_round_trips_into_a_forwardable_request() {
    // The full relay pipeline: JSON payload in, parse at the boundary,
    // verify and execute. The payload mirrors what the reference frontend
    // POSTs, with numeric fields as strings.
    let fwd = deployment();
    let signer = PrivateKeySigner::random();

    let payload = ForwardRequestPayload {
        from: format!("{}", signer.address()),
        to: format!("{}", TARGET),
        value: Quantity::Text("0".into()),
        gas: Quantity::Text("100000".into()),
        nonce: Quantity::Number(0),
        data: "0xa9059cbb".into(),
    };

    let req = payload.parse().unwrap();
    let sig = sign_request(&signer, &fwd, &req);
    let sig_hex = format!("0x{}", hex::encode(&sig));
    let sig_bytes = decode_signature(&sig_hex).unwrap();

    let outcome = fwd.forward(&accepting_target(), &req, &sig_bytes).unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.nonce, U256::ZERO);
}

#[test]
fn independent_senders_interleave_without_interference() {
    let fwd = deployment();
    let alice = PrivateKeySigner::random();
    let bob = PrivateKeySigner::random();

    for round in 0..3u64 {
        for signer in [&alice, &bob] {
            let req = build_request(signer.address(), round);
            let sig = sign_request(signer, &fwd, &req);
            fwd.forward(&accepting_target(), &req, &sig).unwrap();
        }
    }

    assert_eq!(fwd.nonce_of(alice.address()), 3);
    assert_eq!(fwd.nonce_of(bob.address()), 3);
    assert_eq!(fwd.records().len(), 6);
}

#[test]
fn failed_inner_call_is_reported_and_terminal() {
    let fwd = deployment();
    let signer = PrivateKeySigner::random();
    let req = build_request(signer.address(), 0);
    let sig = sign_request(&signer, &fwd, &req);

    let reverting = |_to: Address, _value: U256, _gas: u64, _data: &[u8]| {
        CallOutcome::failure(b"ERC20: insufficient balance".to_vec())
    };

    let outcome = fwd.forward(&reverting, &req, &sig).unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.return_data.as_ref(), b"ERC20: insufficient balance");

    // The nonce is spent; the same pair is dead. Retrying requires a fresh
    // signature over the new nonce.
    assert_eq!(fwd.nonce_of(signer.address()), 1);
    let err = fwd.forward(&accepting_target(), &req, &sig).unwrap_err();
    assert!(matches!(err, ForwardError::InvalidNonce { .. }));
}
