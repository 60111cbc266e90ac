// Buffer-level codecs, one version at a time:
// * round trips over empty, tiny and multi-chunk inputs
// * exact sizes for unpadded formats, exact clear size after decryption for padded ones
// * tampering, truncation and unknown keys

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use envelope_core::config::EncryptionOptions;
    use envelope_core::crypto::{derive_subkey, SymmetricKey};
    use envelope_core::encryptor::{decrypt, decrypted_size, extract_resource_id, max_decrypted_size};
    use envelope_core::formats::{v10, v11, v2, v3, v4, v5, v6, v7, v8, v9, EncryptionMetadata, FixedKey, KeyFinder};
    use envelope_core::padding::Padding;
    use envelope_core::resource_id::{ResourceId, SimpleResourceId, SubkeySeed};
    use envelope_core::{Error, Result};
    use pollster::block_on;

    const CHUNK: u32 = 1000;
    const VERSIONS: [u8; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

    fn is_padded(version: u8) -> bool {
        matches!(version, 6 | 7 | 8 | 10 | 11)
    }

    fn paddings(version: u8) -> Vec<Padding> {
        if is_padded(version) {
            vec![Padding::Auto, Padding::Off, Padding::step(13).unwrap()]
        } else {
            vec![Padding::Off]
        }
    }

    fn encrypt_with(version: u8, clear: &[u8], padding: Padding) -> (Vec<u8>, EncryptionMetadata) {
        let resource_id = SimpleResourceId::random();
        let key = SymmetricKey::random();
        let seed = SubkeySeed::random();
        let options = EncryptionOptions::new(padding, CHUNK);
        let n = clear.len() as u64;

        let size = match version {
            2 => v2::encrypted_size(n),
            3 => v3::encrypted_size(n),
            4 => v4::encrypted_size(n, CHUNK).unwrap(),
            5 => v5::encrypted_size(n),
            6 => v6::encrypted_size(n, padding),
            7 => v7::encrypted_size(n, padding),
            8 => v8::encrypted_size(n, padding, CHUNK).unwrap(),
            9 => v9::encrypted_size(n),
            10 => v10::encrypted_size(n, padding),
            11 => v11::encrypted_size(n, padding, CHUNK).unwrap(),
            _ => unreachable!(),
        };
        let mut out = vec![0u8; size as usize];
        let metadata = match version {
            2 => v2::encrypt(&mut out, clear),
            3 => v3::encrypt(&mut out, clear),
            4 => v4::encrypt(&mut out, clear, &resource_id, &key, CHUNK),
            5 => v5::encrypt(&mut out, clear, &resource_id, &key),
            6 => v6::encrypt(&mut out, clear, padding),
            7 => v7::encrypt(&mut out, clear, &resource_id, &key, padding),
            8 => v8::encrypt(&mut out, clear, &resource_id, &key, options),
            9 => v9::encrypt(&mut out, clear, &resource_id, &key, &seed),
            10 => v10::encrypt(&mut out, clear, &resource_id, &key, &seed, padding),
            11 => v11::encrypt(&mut out, clear, &resource_id, &key, &seed, options),
            _ => unreachable!(),
        }
        .unwrap();
        assert_eq!(out[0], version);
        (out, metadata)
    }

    fn key_store(metadata: &EncryptionMetadata) -> HashMap<SimpleResourceId, SymmetricKey> {
        HashMap::from([(metadata.resource_id, metadata.key)])
    }

    fn decrypt_all<F: KeyFinder>(finder: &F, encrypted: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; max_decrypted_size(encrypted)? as usize];
        let len = block_on(decrypt(&mut out, finder, encrypted))?;
        out.truncate(len);
        Ok(out)
    }

    fn clear_data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn round_trip_every_version() {
        for version in VERSIONS {
            for padding in paddings(version) {
                for len in [0usize, 1, 20, 21, 1000, 4000] {
                    let clear = clear_data(len);
                    let (encrypted, metadata) = encrypt_with(version, &clear, padding);
                    let decrypted = decrypt_all(&key_store(&metadata), &encrypted)
                        .unwrap_or_else(|e| panic!("v{} {:?} len {}: {}", version, padding, len, e));
                    assert_eq!(decrypted, clear, "v{} {:?} len {}", version, padding, len);
                }
            }
        }
    }

    #[test]
    fn round_trip_large_buffers() {
        let clear = clear_data(1_000_000);
        for version in VERSIONS {
            let (encrypted, metadata) = encrypt_with(version, &clear, Padding::Auto);
            assert_eq!(decrypt_all(&key_store(&metadata), &encrypted).unwrap(), clear, "v{}", version);
        }
    }

    #[test]
    fn decrypted_size_matches_clear_size() {
        for version in VERSIONS {
            for padding in paddings(version) {
                for len in [0usize, 1, 21, 961, 2500] {
                    let (encrypted, metadata) = encrypt_with(version, &clear_data(len), padding);
                    let bound = max_decrypted_size(&encrypted).unwrap();
                    if is_padded(version) {
                        assert!(bound >= len as u64, "v{} len {}", version, len);
                        let exact = block_on(decrypted_size(&encrypted, &key_store(&metadata))).unwrap();
                        assert_eq!(exact, len as u64, "v{} {:?} len {}", version, padding, len);
                    } else {
                        assert_eq!(bound, len as u64, "v{} len {}", version, len);
                    }
                }
            }
        }
    }

    #[test]
    fn encryption_is_not_deterministic() {
        let clear = clear_data(64);
        for version in VERSIONS {
            let (a, _) = encrypt_with(version, &clear, Padding::Auto);
            let (b, _) = encrypt_with(version, &clear, Padding::Auto);
            assert_ne!(a, b, "v{}", version);
        }

        // Same key and resource id: the random IV still differs.
        let resource_id = SimpleResourceId::random();
        let key = SymmetricKey::random();
        let mut a = vec![0u8; v5::encrypted_size(64) as usize];
        let mut b = a.clone();
        v5::encrypt(&mut a, &clear, &resource_id, &key).unwrap();
        v5::encrypt(&mut b, &clear, &resource_id, &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn flipped_bytes_fail_to_decrypt() {
        let clear = clear_data(21);
        for version in [2u8, 3, 5, 6, 7, 8, 9, 10, 11] {
            let (encrypted, metadata) = encrypt_with(version, &clear, Padding::Auto);
            let finder = FixedKey(metadata.key);
            // Byte 0 selects the codec and is not flipped.
            for i in 1..encrypted.len() {
                let mut corrupted = encrypted.clone();
                corrupted[i] ^= 0x01;
                match decrypt_all(&finder, &corrupted) {
                    Err(e) => assert!(e.is_decryption_failure(), "v{} byte {}: {:?}", version, i, e),
                    Ok(_) => panic!("v{} byte {}: tampering undetected", version, i),
                }
            }
        }
    }

    #[test]
    fn v4_detects_tampered_seed_and_ciphertext() {
        let clear = clear_data(21);
        let (encrypted, metadata) = encrypt_with(4, &clear, Padding::Off);
        let finder = FixedKey(metadata.key);
        for i in 21..encrypted.len() {
            let mut corrupted = encrypted.clone();
            corrupted[i] ^= 0x01;
            assert!(decrypt_all(&finder, &corrupted).unwrap_err().is_decryption_failure(), "byte {}", i);
        }
    }

    #[test]
    fn truncated_buffers_are_rejected() {
        // Shortest valid envelope of each whole-buffer format.
        let minimums = [(2u8, 41usize), (3, 17), (5, 57), (6, 18), (7, 58), (9, 49), (10, 50)];
        for (version, minimum) in minimums {
            let (encrypted, metadata) = encrypt_with(version, &[], Padding::Off);
            assert!(encrypted.len() >= minimum);
            assert!(extract_resource_id(&encrypted[..minimum]).is_ok(), "v{}", version);
            for len in 1..minimum {
                let truncated = &encrypted[..len];
                assert!(
                    matches!(max_decrypted_size(truncated), Err(Error::TruncatedBuffer(_))),
                    "v{} len {}",
                    version,
                    len
                );
                assert!(
                    matches!(extract_resource_id(truncated), Err(Error::TruncatedBuffer(_))),
                    "v{} len {}",
                    version,
                    len
                );
                let mut out = vec![0u8; 64];
                assert!(
                    matches!(block_on(decrypt(&mut out, &key_store(&metadata), truncated)), Err(Error::TruncatedBuffer(_))),
                    "v{} len {}",
                    version,
                    len
                );
            }
        }

        for (version, header) in [(4u8, 45usize), (8, 45), (11, 37)] {
            let (encrypted, _) = encrypt_with(version, &[1, 2, 3], Padding::Auto);
            for len in 1..header {
                assert!(
                    matches!(max_decrypted_size(&encrypted[..len]), Err(Error::TruncatedBuffer(_))),
                    "v{} len {}",
                    version,
                    len
                );
            }
        }
    }

    #[test]
    fn truncated_chunked_buffers_fail_to_decrypt() {
        for version in [4u8, 8, 11] {
            let (encrypted, metadata) = encrypt_with(version, &clear_data(2500), Padding::Auto);
            for len in [encrypted.len() - 1, encrypted.len() - 17, CHUNK as usize, 2 * CHUNK as usize] {
                let truncated = &encrypted[..len];
                let mut out = vec![0u8; 4096];
                let err = block_on(decrypt(&mut out, &key_store(&metadata), truncated)).unwrap_err();
                assert!(err.is_decryption_failure(), "v{} len {}: {:?}", version, len, err);
            }
        }
    }

    #[test]
    fn unknown_key_is_reported() {
        for version in VERSIONS {
            let (encrypted, _) = encrypt_with(version, b"data", Padding::Auto);
            let empty: HashMap<SimpleResourceId, SymmetricKey> = HashMap::new();
            let err = decrypt_all(&empty, &encrypted).unwrap_err();
            let expected = extract_resource_id(&encrypted).unwrap();
            assert!(matches!(err, Error::KeyNotFound(id) if id == expected), "v{}: {:?}", version, err);
        }
    }

    #[test]
    fn finder_errors_are_propagated() {
        struct Unreachable;
        impl KeyFinder for Unreachable {
            async fn find_key(&self, _: &SimpleResourceId) -> Result<Option<SymmetricKey>> {
                Err(Error::Io(std::io::Error::new(std::io::ErrorKind::NotConnected, "key store offline")))
            }
        }

        for version in VERSIONS {
            let (encrypted, _) = encrypt_with(version, b"data", Padding::Auto);
            assert!(matches!(decrypt_all(&Unreachable, &encrypted), Err(Error::Io(_))), "v{}", version);
        }
    }

    #[test]
    fn closure_finder() {
        let (encrypted, metadata) = encrypt_with(7, b"closure", Padding::Auto);
        let finder = |id: &SimpleResourceId| (*id == metadata.resource_id).then_some(metadata.key);
        assert_eq!(decrypt_all(&finder, &encrypted).unwrap(), b"closure");
    }

    #[test]
    fn resource_ids() {
        let (encrypted, metadata) = encrypt_with(5, b"x", Padding::Off);
        assert_eq!(v5::extract_resource_id(&encrypted).unwrap(), metadata.resource_id);

        // MAC-identified formats
        for version in [2u8, 3, 6] {
            let (encrypted, metadata) = encrypt_with(version, b"x", Padding::Auto);
            assert_eq!(extract_resource_id(&encrypted).unwrap(), ResourceId::Simple(metadata.resource_id));
        }

        for version in [9u8, 10, 11] {
            let (encrypted, metadata) = encrypt_with(version, b"x", Padding::Auto);
            match extract_resource_id(&encrypted).unwrap() {
                ResourceId::Composite(id) => assert_eq!(id.session_id(), metadata.resource_id),
                other => panic!("v{}: {:?}", version, other),
            }
        }
    }

    #[test]
    fn session_formats_fall_back_to_the_individual_key() {
        for version in [9u8, 10, 11] {
            let (encrypted, metadata) = encrypt_with(version, b"individual", Padding::Auto);
            let ResourceId::Composite(id) = extract_resource_id(&encrypted).unwrap() else {
                panic!("composite id expected");
            };
            let subkey = derive_subkey(&metadata.key, &id.subkey_seed());
            let finder = HashMap::from([(id.individual_resource_id(), subkey)]);
            assert_eq!(decrypt_all(&finder, &encrypted).unwrap(), b"individual", "v{}", version);
        }
    }

    #[test]
    fn session_resources_share_the_session_id() {
        let session_id = SimpleResourceId::random();
        let session_key = SymmetricKey::random();
        let options = EncryptionOptions::new(Padding::Auto, CHUNK);
        let size = v11::encrypted_size(5, Padding::Auto, CHUNK).unwrap() as usize;

        let mut a = vec![0u8; size];
        let mut b = vec![0u8; size];
        v11::encrypt(&mut a, b"first", &session_id, &session_key, &SubkeySeed::random(), options).unwrap();
        v11::encrypt(&mut b, b"other", &session_id, &session_key, &SubkeySeed::random(), options).unwrap();
        assert_ne!(a, b);

        let id_a = v11::extract_resource_id(&a).unwrap();
        let id_b = v11::extract_resource_id(&b).unwrap();
        assert_eq!(id_a.session_id(), id_b.session_id());
        assert_ne!(id_a.individual_resource_id(), id_b.individual_resource_id());

        let finder = HashMap::from([(session_id, session_key)]);
        assert_eq!(decrypt_all(&finder, &a).unwrap(), b"first");
        assert_eq!(decrypt_all(&finder, &b).unwrap(), b"other");
    }

    #[test]
    fn small_output_buffers_are_rejected() {
        let mut out = vec![0u8; v2::encrypted_size(10) as usize - 1];
        assert!(matches!(v2::encrypt(&mut out, &[0u8; 10]), Err(Error::InvalidArgument(_))));

        let mut out = vec![0u8; 10];
        let err = v4::encrypt(&mut out, &[0u8; 10], &SimpleResourceId::random(), &SymmetricKey::random(), CHUNK);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));

        let (encrypted, metadata) = encrypt_with(4, &clear_data(100), Padding::Off);
        let mut out = vec![0u8; 99];
        let err = block_on(decrypt(&mut out, &key_store(&metadata), &encrypted)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn chunk_sizes_without_room_are_rejected() {
        assert!(matches!(v4::encrypted_size(10, 61), Err(Error::InvalidArgument(_))));
        assert!(matches!(v8::encrypted_size(10, Padding::Auto, 62), Err(Error::InvalidArgument(_))));
        assert!(matches!(v11::encrypted_size(10, Padding::Auto, 20), Err(Error::InvalidArgument(_))));
        assert!(v11::encrypted_size(10, Padding::Auto, 21).is_ok());
    }

    #[test]
    fn chunked_sizes() {
        // clear chunk of v4 with 70-byte chunks is 9 bytes
        assert_eq!(v4::encrypted_size(0, 70).unwrap(), 61);
        assert_eq!(v4::encrypted_size(9, 70).unwrap(), 70 + 61);
        assert_eq!(v4::encrypted_size(10, 70).unwrap(), 70 + 62);
        // v8: 8 clear bytes per chunk, padded size minus the sentinel is split
        assert_eq!(v8::encrypted_size(16, Padding::Auto, 70).unwrap(), 2 * 70 + 62);
        assert_eq!(v8::encrypted_size(15, Padding::Auto, 70).unwrap(), 2 * 70 + 62);
        assert_eq!(v8::encrypted_size(4, Padding::step(23).unwrap(), 70).unwrap(), 3 * 70 - 1);
        // v11: session header, then 50 clear bytes per chunk
        // even unpadded, an empty input carries one padding byte
        assert_eq!(v11::encrypted_size(0, Padding::Off, 70).unwrap(), 37 + 1 + 20);
        assert_eq!(v11::encrypted_size(50, Padding::Off, 70).unwrap(), 37 + 70 + 20);
        assert_eq!(v11::encrypted_size(0, Padding::Auto, 70).unwrap(), 37 + 30);
    }
}
