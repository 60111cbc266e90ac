#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use envelope_core::crypto::Mac;
    use envelope_core::resource_id::{CompositeResourceId, ResourceId, SimpleResourceId, SubkeySeed};
    use envelope_core::Error;

    #[test]
    fn composite_layout() {
        let session_id = SimpleResourceId::new([0xaa; 16]);
        let seed = SubkeySeed::new([0xbb; 16]);
        let id = CompositeResourceId::new_transparent_session_id(&session_id, &seed);

        assert_eq!(id.as_bytes().len(), 33);
        assert_eq!(id.as_bytes()[0], CompositeResourceId::TRANSPARENT_SESSION_TYPE);
        assert_eq!(id.composite_type(), 0);
        assert_eq!(id.session_id(), session_id);
        assert_eq!(id.individual_resource_id(), SimpleResourceId::new([0xbb; 16]));
        assert_eq!(id.subkey_seed(), seed);
    }

    #[test]
    fn parse_by_length() {
        let simple = ResourceId::from_bytes(&[1u8; 16]).unwrap();
        assert!(matches!(simple, ResourceId::Simple(_)));
        assert_eq!(simple.session_id(), None);

        let composite = ResourceId::try_from(&[0u8; 33][..]).unwrap();
        assert!(matches!(composite, ResourceId::Composite(_)));
        assert_eq!(composite.session_id(), Some(SimpleResourceId::default()));
        assert_eq!(composite.as_bytes().len(), 33);

        for len in [0usize, 15, 17, 32, 34] {
            let err = ResourceId::from_bytes(&vec![0u8; len]).unwrap_err();
            assert!(matches!(err, Error::InvalidBufferSize { what: "ResourceId", actual } if actual == len));
        }
    }

    #[test]
    fn simple_id_from_wrong_slice_length() {
        assert!(matches!(SimpleResourceId::try_from(&[0u8; 15][..]), Err(Error::InvalidBufferSize { .. })));
        assert!(SimpleResourceId::try_from(&[0u8; 16][..]).is_ok());
        assert!(matches!(SubkeySeed::try_from(&[0u8; 17][..]), Err(Error::InvalidBufferSize { .. })));
        assert!(SubkeySeed::try_from(&[0u8; 16][..]).is_ok());
    }

    #[test]
    fn display_is_lowercase_hex() {
        let id = SimpleResourceId::new([0xab; 16]);
        assert_eq!(id.to_string(), "ab".repeat(16));
        assert_eq!(ResourceId::from(id).to_string(), "ab".repeat(16));
        assert!(format!("{:?}", id).starts_with("SimpleResourceId("));
    }

    #[test]
    fn mac_converts_to_resource_id() {
        let mac = Mac::new([5u8; 16]);
        assert_eq!(SimpleResourceId::from(mac).as_bytes(), &[5u8; 16]);
    }

    #[test]
    fn ids_order_by_bytes() {
        let ids: BTreeSet<_> = [[3u8; 16], [1u8; 16], [2u8; 16]].into_iter().map(SimpleResourceId::new).collect();
        let ordered: Vec<_> = ids.into_iter().map(|id| id.as_bytes()[0]).collect();
        assert_eq!(ordered, vec![1, 2, 3]);
    }
}
