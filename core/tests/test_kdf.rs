#[cfg(test)]
mod tests {
    use envelope_core::crypto::{derive_iv, derive_subkey, generichash_24, generichash_32, session_iv, AeadIv, SymmetricKey};
    use envelope_core::resource_id::{SimpleResourceId, SubkeySeed};
    use proptest::prelude::*;

    #[test]
    fn derive_iv_depends_on_the_index() {
        let seed = AeadIv::random();
        assert_eq!(derive_iv(&seed, 0), derive_iv(&seed, 0));
        assert_ne!(derive_iv(&seed, 0), derive_iv(&seed, 1));
        assert_ne!(derive_iv(&seed, 0), seed);
    }

    #[test]
    fn derive_iv_hashes_seed_then_little_endian_index() {
        let seed = AeadIv::new([7u8; 24]);
        let expected = generichash_24(&[&[7u8; 24], &[1, 0, 0, 0, 0, 0, 0, 0]]);
        assert_eq!(derive_iv(&seed, 1).as_bytes(), &expected);
    }

    #[test]
    fn generic_hash_concatenates_parts() {
        assert_eq!(generichash_32(&[b"ab", b"cd"]), generichash_32(&[b"abcd"]));
        assert_ne!(generichash_32(&[b"abcd"]), generichash_32(&[b"abce"]));
    }

    #[test]
    fn subkey_is_key_then_seed() {
        let key = SymmetricKey::new([1u8; 32]);
        let seed = SubkeySeed::new([2u8; 16]);
        let expected = generichash_32(&[&[1u8; 32], &[2u8; 16]]);
        assert_eq!(derive_subkey(&key, &seed).as_bytes(), &expected);
    }

    #[test]
    fn session_iv_is_zero_extended_session_id() {
        let session_id = SimpleResourceId::random();
        let iv = session_iv(&session_id);
        assert_eq!(&iv.as_bytes()[..16], session_id.as_ref());
        assert_eq!(&iv.as_bytes()[16..], &[0u8; 8]);
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = SymmetricKey::new([0xab; 32]);
        assert!(!format!("{:?}", key).contains("abab"));
    }

    proptest! {
        #[test]
        fn prop_subkeys_differ_per_seed(s1 in any::<[u8; 16]>(), s2 in any::<[u8; 16]>()) {
            let key = SymmetricKey::new([9u8; 32]);
            let k1 = derive_subkey(&key, &SubkeySeed::new(s1));
            let k2 = derive_subkey(&key, &SubkeySeed::new(s2));
            if s1 != s2 {
                prop_assert_ne!(k1, k2);
            } else {
                prop_assert_eq!(k1, k2);
            }
        }

        #[test]
        fn prop_chunk_ivs_are_distinct(seed in any::<[u8; 24]>(), i in 0u64..1_000_000) {
            let seed = AeadIv::new(seed);
            prop_assert_ne!(derive_iv(&seed, i), derive_iv(&seed, i + 1));
        }
    }
}
