// Wire layout of the chunk and session headers:
// * field offsets and endianness
// * rejection of foreign versions, short buffers and unusable chunk sizes
// * mapping of header errors onto the crate error

#[cfg(test)]
mod tests {
    use envelope_core::crypto::AeadIv;
    use envelope_core::headers::{
        decode_chunk_header, decode_session_header, encode_chunk_header, encode_session_header, ChunkHeader,
        HeaderError, HeaderMismatch, SessionHeader,
    };
    use envelope_core::resource_id::{CompositeResourceId, SimpleResourceId, SubkeySeed};
    use envelope_core::Error;

    fn chunk_header(version: u8) -> ChunkHeader {
        ChunkHeader::new(version, 0x46, SimpleResourceId::new([0x11; 16]), AeadIv::new([0x22; 24]))
    }

    #[test]
    fn chunk_header_layout() {
        let bytes = encode_chunk_header(&chunk_header(8));
        assert_eq!(bytes.len(), 45);
        assert_eq!(bytes[0], 8);
        assert_eq!(&bytes[1..5], &[0x46, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[5..21], &[0x11; 16]);
        assert_eq!(&bytes[21..45], &[0x22; 24]);
        assert_eq!(decode_chunk_header(&bytes).unwrap(), chunk_header(8));
    }

    #[test]
    fn chunk_header_ignores_trailing_bytes() {
        let mut bytes = encode_chunk_header(&chunk_header(4)).to_vec();
        bytes.extend_from_slice(&[0xff; 10]);
        assert_eq!(decode_chunk_header(&bytes).unwrap(), chunk_header(4));
    }

    #[test]
    fn chunk_header_rejects_foreign_versions() {
        let mut bytes = encode_chunk_header(&chunk_header(4));
        for version in [0u8, 2, 3, 5, 11, 0xff] {
            bytes[0] = version;
            assert_eq!(decode_chunk_header(&bytes).unwrap_err(), HeaderError::UnsupportedVersion(version));
        }
    }

    #[test]
    fn chunk_header_rejects_short_buffers() {
        let bytes = encode_chunk_header(&chunk_header(4));
        assert!(matches!(decode_chunk_header(&bytes[..44]), Err(HeaderError::BufferTooShort { have: 44, need: 45 })));
        assert!(matches!(decode_chunk_header(&[]), Err(HeaderError::BufferTooShort { .. })));
    }

    #[test]
    fn chunk_header_rejects_chunks_smaller_than_framing() {
        let mut bytes = encode_chunk_header(&chunk_header(4));
        bytes[1] = 2;
        assert_eq!(decode_chunk_header(&bytes).unwrap_err(), HeaderError::InvalidChunkSize { size: 2, min: 61 });
        bytes[1] = 61;
        assert!(decode_chunk_header(&bytes).is_ok());
    }

    #[test]
    fn session_header_layout() {
        let session_id = SimpleResourceId::new([0x33; 16]);
        let seed = SubkeySeed::new([0x44; 16]);
        let header = SessionHeader::new(
            11,
            0x0010_0000,
            CompositeResourceId::new_transparent_session_id(&session_id, &seed),
        );
        let bytes = encode_session_header(&header);
        assert_eq!(bytes.len(), 37);
        assert_eq!(bytes[0], 11);
        assert_eq!(&bytes[1..17], &[0x33; 16]);
        assert_eq!(&bytes[17..33], &[0x44; 16]);
        assert_eq!(&bytes[33..37], &[0x00, 0x00, 0x10, 0x00]);

        let decoded = decode_session_header(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.resource_id.session_id(), session_id);
        assert_eq!(decoded.resource_id.subkey_seed(), seed);
    }

    #[test]
    fn session_header_rejects_chunk_headers() {
        let bytes = encode_chunk_header(&chunk_header(8));
        assert_eq!(decode_session_header(&bytes).unwrap_err(), HeaderError::UnsupportedVersion(8));
    }

    #[test]
    fn same_stream_check() {
        let first = chunk_header(4);

        let mut other = first;
        other.seed = AeadIv::random();
        assert!(other.check_same_stream(&first).is_ok());

        let mut other = first;
        other.version = 8;
        assert!(matches!(other.check_same_stream(&first), Err(HeaderMismatch::Version { expected: 4, actual: 8 })));

        let mut other = first;
        other.resource_id = SimpleResourceId::random();
        assert!(matches!(other.check_same_stream(&first), Err(HeaderMismatch::ResourceId { .. })));

        let mut other = first;
        other.encrypted_chunk_size = 69;
        let err = other.check_same_stream(&first).unwrap_err();
        assert_eq!(err.to_string(), "encryptedChunkSize mismatch in headers: expected 70, got 69");
    }

    #[test]
    fn header_errors_map_to_crate_errors() {
        let e: Error = HeaderError::BufferTooShort { have: 1, need: 45 }.into();
        assert!(matches!(e, Error::TruncatedBuffer(_)));
        let e: Error = HeaderError::UnsupportedVersion(42).into();
        assert!(matches!(e, Error::UnsupportedVersion(42)));
        let e: Error = HeaderError::InvalidChunkSize { size: 2, min: 61 }.into();
        assert!(matches!(e, Error::InvalidArgument(_)));
    }
}
