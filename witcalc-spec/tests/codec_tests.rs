//! Frame codec tests across field sizes and encoding boundaries

use num_bigint::BigUint;
use proptest::prelude::*;
use witcalc_spec::{decode, encode, Encoding, FieldParams, WitcalcError, LONG_FLAG, MONTGOMERY_FLAG};

const BN254_PRIME: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// 2^61 - 1, an 8-byte field
const MERSENNE_61: u64 = (1 << 61) - 1;

fn bn254() -> FieldParams {
    let prime = BigUint::parse_bytes(BN254_PRIME.as_bytes(), 10).unwrap();
    FieldParams::new(prime, 32).unwrap()
}

fn mersenne() -> FieldParams {
    FieldParams::new(BigUint::from(MERSENNE_61), 8).unwrap()
}

fn round_trip(params: &FieldParams, value: &BigUint) -> (Encoding, BigUint) {
    let mut frame = vec![0u8; params.frame_len()];
    let encoding = encode(params, &mut frame, value).unwrap();
    (encoding, decode(params, &frame).unwrap())
}

// ============================================================================
// Branch Boundaries
// ============================================================================

#[test]
fn test_boundaries_bn254() {
    let params = bn254();
    let p = params.prime().clone();

    let cases = [
        (BigUint::from(0u32), "short positive"),
        (BigUint::from(0x7fff_ffffu32), "short positive"),
        (BigUint::from(0x8000_0000u32), "long"),
        (&p - 0x8000_0001u32, "long"),
        (&p - 0x8000_0000u32, "short negative"),
        (&p - 1u32, "short negative"),
    ];

    for (value, branch) in cases {
        let (encoding, decoded) = round_trip(&params, &value);
        assert_eq!(encoding.branch(), branch, "value {value}");
        assert_eq!(decoded, value);
    }
}

#[test]
fn test_boundaries_small_field() {
    let params = mersenne();
    let p = params.prime().clone();

    for value in [
        BigUint::from(1u32),
        BigUint::from(u32::MAX),
        &p - 0x8000_0000u32,
        &p - 2u32,
    ] {
        assert_eq!(round_trip(&params, &value).1, value);
    }
}

#[test]
fn test_short_negative_word() {
    let params = bn254();
    let p = params.prime().clone();
    let mut frame = vec![0u8; params.frame_len()];

    encode(&params, &mut frame, &(&p - 1u32)).unwrap();
    assert_eq!(&frame[..4], &0xffff_ffffu32.to_le_bytes());
    assert_eq!(&frame[4..8], &[0, 0, 0, 0]);

    encode(&params, &mut frame, &(&p - 0x8000_0000u32)).unwrap();
    assert_eq!(&frame[..4], &0x8000_0000u32.to_le_bytes());
}

// ============================================================================
// Long Frames
// ============================================================================

#[test]
fn test_long_frame_layout() {
    let params = mersenne();
    let value = BigUint::from(0x0123_4567_89ab_cdefu64 % MERSENNE_61);
    let mut frame = vec![0xaau8; params.frame_len()];

    assert_eq!(encode(&params, &mut frame, &value).unwrap(), Encoding::Long);
    assert_eq!(&frame[..4], &[0, 0, 0, 0]);
    assert_eq!(&frame[4..8], &LONG_FLAG.to_le_bytes());
    assert_eq!(
        &frame[8..16],
        &(0x0123_4567_89ab_cdefu64 % MERSENNE_61).to_le_bytes()
    );
}

#[test]
fn test_montgomery_frame_decodes_to_plain() {
    let params = bn254();
    let value = BigUint::parse_bytes(b"123456789123456789123456789", 10).unwrap();
    let mont = params.to_montgomery(&value);

    let mut frame = vec![0u8; params.frame_len()];
    frame[4..8].copy_from_slice(&(LONG_FLAG | MONTGOMERY_FLAG).to_le_bytes());
    let mut payload = mont.to_bytes_le();
    payload.resize(32, 0);
    frame[8..40].copy_from_slice(&payload);

    assert_eq!(decode(&params, &frame).unwrap(), value);
}

#[test]
fn test_short_frame_ignores_payload() {
    let params = bn254();
    let mut frame = vec![0xffu8; params.frame_len()];
    frame[..8].copy_from_slice(&[9, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(decode(&params, &frame).unwrap(), BigUint::from(9u32));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_value_not_reduced() {
    let params = bn254();
    let mut frame = vec![0u8; params.frame_len()];
    let err = encode(&params, &mut frame, &params.prime().clone()).unwrap_err();
    assert!(matches!(err, WitcalcError::ValueOutOfRange { .. }));
}

#[test]
fn test_frame_too_short() {
    let params = bn254();
    let mut frame = vec![0u8; 12];
    let err = encode(&params, &mut frame, &BigUint::from(u64::MAX)).unwrap_err();
    assert!(matches!(
        err,
        WitcalcError::FrameTooShort {
            expected: 40,
            found: 12
        }
    ));
    assert!(decode(&params, &frame[..4]).is_err());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_round_trip_small_field(v in 0u64..MERSENNE_61) {
        let params = mersenne();
        let value = BigUint::from(v);
        prop_assert_eq!(round_trip(&params, &value).1, value);
    }

    #[test]
    fn prop_round_trip_near_prime(k in 1u64..(1 << 40)) {
        let params = bn254();
        let value = params.prime() - k;
        prop_assert_eq!(round_trip(&params, &value).1, value);
    }

    #[test]
    fn prop_encoding_overwrites_stale_frames(a in 0u64..MERSENNE_61, b in 0u64..MERSENNE_61) {
        let params = mersenne();
        let mut frame = vec![0u8; params.frame_len()];
        encode(&params, &mut frame, &BigUint::from(a)).unwrap();
        encode(&params, &mut frame, &BigUint::from(b)).unwrap();
        prop_assert_eq!(decode(&params, &frame).unwrap(), BigUint::from(b));
    }
}
