// Group properties of commitments over random blinds and values

use mweb_crypto::codec::{compress, decompress};
use mweb_crypto::{blind_sum, commit, commit_sum, generator_h, BlindingFactor, Commitment, MwebError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn blind(hex_str: &str) -> BlindingFactor {
    BlindingFactor::from_slice(&hex::decode(hex_str).unwrap()).unwrap()
}

#[test]
fn test_known_commitments() {
    init_logger();

    let vectors = [
        (
            "7e05e476e3159797fe8f0578ad37bfd5775a70e0674ad928bdec74ab7e430880",
            1_100_000_000u64,
            "09e2fc408916f7813179b6540c91d7d39e779ccc42a522bdfb154004cae85409d2",
        ),
        (
            "4242424242424242424242424242424242424242424242424242424242424242",
            0,
            "0824653eac434488002cc06bbfb7f10fe18991e35f9fe4302dbea6d2353dc0ab1c",
        ),
    ];

    for (blind_hex, value, expected) in vectors {
        let commitment = commit(&blind(blind_hex), value).unwrap();
        println!("commit({}, {}) = {}", blind_hex, value, commitment);
        assert_eq!(hex::encode(commitment.as_bytes()), expected);
    }
}

#[test]
fn test_generator_h_encoding() {
    let h = generator_h().unwrap();
    let encoded = compress(h).unwrap();
    assert_eq!(
        hex::encode(encoded),
        "0950929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0"
    );
    assert_eq!(&decompress(&encoded).unwrap(), h);
}

#[test]
fn test_homomorphism() {
    let mut rng = StdRng::seed_from_u64(0x6d77_6562);
    for _ in 0..32 {
        let b1 = BlindingFactor::random(&mut rng);
        let b2 = BlindingFactor::random(&mut rng);
        let v1 = rng.gen_range(0..1u64 << 62);
        let v2 = rng.gen_range(0..1u64 << 62);

        let c1 = commit(&b1, v1).unwrap();
        let c2 = commit(&b2, v2).unwrap();
        assert_eq!(c1.add(&c2).unwrap(), commit(&(b1 + b2), v1 + v2).unwrap());
    }
}

#[test]
fn test_add_then_sub_is_identity() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..32 {
        let c1 = commit(&BlindingFactor::random(&mut rng), rng.gen()).unwrap();
        let c2 = commit(&BlindingFactor::random(&mut rng), rng.gen()).unwrap();
        if c1 == c2 {
            continue;
        }
        assert_eq!(c1.add(&c2).unwrap().sub(&c2).unwrap(), c1);
    }
}

#[test]
fn test_point_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..64 {
        let c = commit(&BlindingFactor::random(&mut rng), rng.gen()).unwrap();
        let point = c.to_point().unwrap();
        assert_eq!(decompress(&compress(&point).unwrap()).unwrap(), point);
        assert_eq!(Commitment::from_point(&point).unwrap(), c);
    }
}

#[test]
fn test_balanced_transaction() {
    let mut rng = StdRng::seed_from_u64(99);
    let in_blinds = [BlindingFactor::random(&mut rng), BlindingFactor::random(&mut rng)];
    let out_blind = BlindingFactor::random(&mut rng);
    let inputs = [
        commit(&in_blinds[0], 600_000_000).unwrap(),
        commit(&in_blinds[1], 500_000_000).unwrap(),
    ];
    let output = commit(&out_blind, 1_100_000_000).unwrap();

    // outputs - inputs is a commitment to zero under the excess blind
    let excess = blind_sum(&[out_blind], &in_blinds);
    assert_eq!(
        commit_sum(&[output], &inputs).unwrap(),
        commit(&excess, 0).unwrap()
    );

    // one unit short no longer balances
    let short = commit(&out_blind, 1_099_999_999).unwrap();
    assert_ne!(
        commit_sum(&[short], &inputs).unwrap(),
        commit(&excess, 0).unwrap()
    );
}

#[test]
fn test_malformed_operands_rejected() {
    let mut bad = [0u8; 33];
    bad[0] = 0x02;
    assert_eq!(Commitment::from_slice(&bad), Err(MwebError::InvalidCommitment));
    assert_eq!(
        Commitment::from_slice(&[0x08; 32]),
        Err(MwebError::InvalidCommitment)
    );

    let valid = commit(&blind(&"11".repeat(32)), 5).unwrap();
    let garbage = Commitment::from_bytes([0x07; 33]);
    assert_eq!(valid.add(&garbage), Err(MwebError::InvalidCommitment));
    assert_eq!(garbage.sub(&valid), Err(MwebError::InvalidCommitment));
}
