use chaosvault::pipeline::{tags_match, Digester, MARKER, SEED_MAX, SEED_MIN};
use chaosvault::{
    chaos_stream, compress, decompress, decrypt, derive_seed, digest, encrypt,
    encrypt_with_progress, fingerprint, VaultError,
};
use proptest::prelude::*;

#[test]
fn compress_scenarios() {
    assert_eq!(compress(b"AAAA"), vec![0xFE, 4, 0x41]);
    assert_eq!(decompress(&[0xFE, 4, 0x41]), b"AAAA");

    assert_eq!(compress(&[0xFE]), vec![0xFE, 1, 0xFE]);
    assert_eq!(decompress(&[0xFE, 1, 0xFE]), vec![0xFE]);
}

#[test]
fn empty_payload_container() -> Result<(), VaultError> {
    let sealed = encrypt(&[], "password1")?;
    assert_eq!(sealed.container, vec![0u8; 8]);
    let plain = decrypt(&sealed.container, "password1", &sealed.fingerprint, &sealed.digest)?;
    assert!(plain.is_empty());
    Ok(())
}

#[test]
fn wrong_password_is_rejected_before_digest() {
    let sealed = encrypt(&[1, 2, 3], "password1").unwrap();
    // A bogus digest would fail the integrity check; the password check must come first
    let err = decrypt(&sealed.container, "wrongpass", &sealed.fingerprint, "not-a-digest")
        .expect_err("wrong password must fail");
    assert!(matches!(err, VaultError::WrongPassword));
}

#[test]
fn flipped_ciphertext_byte_is_integrity_failure() {
    let sealed = encrypt(&[1, 2, 3], "password1").unwrap();
    let mut container = sealed.container.clone();
    container[8] ^= 0x01;
    let err = decrypt(&container, "password1", &sealed.fingerprint, &sealed.digest)
        .expect_err("tampered container must fail");
    assert!(matches!(err, VaultError::IntegrityFailure));
}

#[test]
fn single_bit_flips_are_mostly_detected() {
    let data: Vec<u8> = b"The quick brown fox jumps over the lazy dog".to_vec();
    let sealed = encrypt(&data, "bitflip").unwrap();

    // The absorb step lets some low-bit flips cancel out, so detection is
    // high but not total.
    let mut detected = 0;
    let mut total = 0;
    for index in 0..sealed.container.len() {
        for bit in 0..8 {
            let mut container = sealed.container.clone();
            container[index] ^= 1 << bit;
            total += 1;
            match decrypt(&container, "bitflip", &sealed.fingerprint, &sealed.digest) {
                Err(VaultError::IntegrityFailure) => detected += 1,
                Ok(plain) => assert_ne!(plain, data, "flip at byte {} bit {}", index, bit),
                Err(_) => {}
            }
        }
    }
    assert!(
        detected * 10 >= total * 9,
        "only {}/{} flips detected",
        detected,
        total
    );
}

#[test]
fn streaming_digest_matches_one_shot() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i ^ (i >> 3)) as u8).collect();
    let mut digester = Digester::new("stream");
    for chunk in data.chunks(777) {
        digester.update(chunk);
    }
    assert!(tags_match(&digester.finalize(), &digest(&data, "stream")));
}

#[test]
fn progress_chunking_preserves_container() {
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 97) as u8).collect();
    let one_shot = encrypt(&data, "chunks").unwrap();
    let mut checkpoints = 0;
    let chunked = encrypt_with_progress(&data, "chunks", 4096, |_| checkpoints += 1).unwrap();
    assert_eq!(one_shot, chunked);
    assert!(checkpoints > 2);
}

proptest! {
    #[test]
    fn seed_stays_in_bounds(password in ".*") {
        let seed = derive_seed(&password);
        prop_assert!((SEED_MIN..=SEED_MAX).contains(&seed));
    }

    #[test]
    fn rle_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert_eq!(decompress(&compress(&data)), data);
    }

    #[test]
    fn rle_roundtrip_runs(
        runs in proptest::collection::vec((prop_oneof![Just(MARKER), any::<u8>()], 1usize..600), 0..8)
    ) {
        let data: Vec<u8> = runs
            .iter()
            .flat_map(|&(value, len)| std::iter::repeat(value).take(len))
            .collect();
        prop_assert_eq!(decompress(&compress(&data)), data);
    }

    #[test]
    fn compressed_output_never_has_bare_marker(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let compressed = compress(&data);
        let mut i = 0;
        while i < compressed.len() {
            if compressed[i] == MARKER {
                prop_assert!(i + 2 < compressed.len());
                prop_assert!(compressed[i + 1] >= 1);
                i += 3;
            } else {
                i += 1;
            }
        }
    }

    #[test]
    fn encrypt_decrypt_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..1024),
        password in "[ -~]{0,24}",
    ) {
        let sealed = encrypt(&data, &password).unwrap();
        prop_assert_eq!(sealed.container.len(), 8 + compress(&data).len());
        let plain = decrypt(&sealed.container, &password, &sealed.fingerprint, &sealed.digest).unwrap();
        prop_assert_eq!(plain, data);
    }

    #[test]
    fn chaos_stream_is_deterministic(seed in 0.0001f64..0.9999, count in 0usize..512) {
        let a: Vec<u8> = chaos_stream(seed, count).collect();
        let b: Vec<u8> = chaos_stream(seed, count).collect();
        prop_assert_eq!(a.len(), count);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_is_stable(password in ".{0,32}") {
        let fp = fingerprint(&password);
        prop_assert_eq!(fp.len(), 64);
        prop_assert_eq!(fp, fingerprint(&password));
    }
}
