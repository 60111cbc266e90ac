// ## 📂 File: `src/stream/decrypt.rs`

//! Chunked decryption streams.
//!
//! `create` reads the first header, resolves the key and decrypts the first
//! chunk before returning, so a wrong key or a corrupted first chunk is
//! reported at construction. Every later v4/v8 header must repeat the
//! version, resource id and chunk size of the first one.
//!
//! Header parse failures are reported as `DecryptionFailed` here, unlike the
//! buffer-level codecs.

use byteorder::{ByteOrder, LittleEndian};
use futures::io::AsyncRead;
use tracing::{debug, trace};

use crate::constants::{versions, MAC_LEN};
use crate::crypto::{self, derive_iv, session_iv, AeadIv, SymmetricKey};
use crate::formats::{require_key, require_session_key, v11, v8, KeyFinder};
use crate::headers::{decode_chunk_header, decode_session_header, encode_chunk_header, ChunkHeader, SessionHeader};
use crate::padding::unpadded_size;
use crate::resource_id::{CompositeResourceId, SimpleResourceId};
use crate::stream::buffered::{BufferedStream, ChunkProcessor, StreamInput};
use crate::types::{Error, Result};

const TRUNCATED_HEADER: &str = "truncated buffer: could not read encrypted input header";

async fn read_header<R: AsyncRead + Unpin>(input: &mut StreamInput<R>, len: usize) -> Result<&[u8]> {
    let buf = input.read_input_source(len).await?;
    if buf.len() != len {
        return Err(Error::decryption(TRUNCATED_HEADER));
    }
    Ok(buf)
}

async fn read_chunk_header<R: AsyncRead + Unpin>(input: &mut StreamInput<R>) -> Result<ChunkHeader> {
    let buf = read_header(input, ChunkHeader::LEN).await?;
    decode_chunk_header(buf).map_err(|e| Error::decryption(e.to_string()))
}

/// v4/v8 chunk decoder. v8 chunks are unpadded one by one.
#[derive(Debug)]
pub struct ChunkDecryptor {
    header: ChunkHeader,
    key: SymmetricKey,
    chunk_index: u64,
    /// The first header is read by `create`.
    first_header_pending: bool,
    only_padding_left: bool,
}

impl ChunkDecryptor {
    fn new(header: ChunkHeader, key: SymmetricKey) -> Self {
        Self { header, key, chunk_index: 0, first_header_pending: true, only_padding_left: false }
    }

    #[inline]
    fn is_padded(&self) -> bool {
        self.header.version == versions::V8
    }
}

impl ChunkProcessor for ChunkDecryptor {
    async fn process_input<R: AsyncRead + Unpin>(
        &mut self,
        input: &mut StreamInput<R>,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        if self.first_header_pending {
            self.first_header_pending = false;
        } else {
            let header = read_chunk_header(input).await?;
            header
                .check_same_stream(&self.header)
                .map_err(|e| Error::decryption(e.to_string()))?;
            self.header = header;
        }

        let body_size = self.header.encrypted_chunk_size as usize - ChunkHeader::LEN;
        let encrypted = input.read_input_source(body_size).await?;
        if encrypted.len() < MAC_LEN {
            return Err(Error::decryption("truncated buffer: missing chunk data"));
        }

        let iv = derive_iv(&self.header.seed, self.chunk_index);
        let encoded = encode_chunk_header(&self.header);
        let ad: &[u8] = if self.is_padded() { &encoded } else { &[] };
        output.resize(encrypted.len() - MAC_LEN, 0);
        crypto::decrypt_aead(&self.key, &iv, output, encrypted, ad)?;
        trace!(index = self.chunk_index, version = self.header.version, "chunk opened");
        self.chunk_index += 1;

        if self.is_padded() {
            let clear_len = unpadded_size(output)?;
            output.truncate(clear_len);
            if self.only_padding_left && clear_len != 0 {
                return Err(Error::decryption("unable to remove padding"));
            }
            let clear_chunk_size = (self.header.encrypted_chunk_size as usize).saturating_sub(v8::CHUNK_OVERHEAD);
            if clear_len < clear_chunk_size {
                self.only_padding_left = true;
            }
        }

        if input.is_input_end_of_stream() {
            input.end_output_stream();
        }
        Ok(())
    }
}

/// v11 chunk decoder.
#[derive(Debug)]
pub struct SessionDecryptor {
    header: SessionHeader,
    key: SymmetricKey,
    associated_data: [u8; SessionHeader::LEN],
    iv_seed: AeadIv,
    chunk_index: u64,
    only_padding_left: bool,
}

impl SessionDecryptor {
    fn new(header: SessionHeader, key: SymmetricKey) -> Self {
        let session_id = header.resource_id.session_id();
        Self {
            associated_data: v11::make_mac_data(
                &session_id,
                &header.resource_id.subkey_seed(),
                header.encrypted_chunk_size,
            ),
            iv_seed: session_iv(&session_id),
            header,
            key,
            chunk_index: 0,
            only_padding_left: false,
        }
    }
}

impl ChunkProcessor for SessionDecryptor {
    async fn process_input<R: AsyncRead + Unpin>(
        &mut self,
        input: &mut StreamInput<R>,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        let encrypted = input.read_input_source(self.header.encrypted_chunk_size as usize).await?;
        let encrypted_len = encrypted.len();
        if encrypted_len < v11::CHUNK_OVERHEAD {
            return Err(Error::decryption("truncated buffer: missing chunk metadata"));
        }

        let iv = derive_iv(&self.iv_seed, self.chunk_index);
        output.resize(encrypted_len - MAC_LEN, 0);
        crypto::decrypt_aead(&self.key, &iv, output, encrypted, &self.associated_data)?;
        self.chunk_index += 1;

        let padding_size = LittleEndian::read_u32(&output[..v11::PADDING_SIZE_LEN]) as usize;
        if padding_size > encrypted_len - v11::CHUNK_OVERHEAD {
            return Err(Error::decryption("invalid padding size value"));
        }
        let data_offset = v11::PADDING_SIZE_LEN + padding_size;
        if self.only_padding_left && output.len() > data_offset {
            return Err(Error::decryption("invalid padding"));
        }
        if padding_size > 0 {
            self.only_padding_left = true;
        }
        output.drain(..data_offset);
        trace!(index = self.chunk_index - 1, padding_size, "v11 chunk opened");

        if input.is_input_end_of_stream() {
            input.end_output_stream();
        }
        Ok(())
    }
}

/// v4/v8 decryption stream.
pub type ChunkDecryptionStream<R> = BufferedStream<R, ChunkDecryptor>;
/// v11 decryption stream.
pub type SessionDecryptionStream<R> = BufferedStream<R, SessionDecryptor>;

impl<R: AsyncRead + Unpin> ChunkDecryptionStream<R> {
    /// Read the first header, resolve its key and decrypt the first chunk.
    ///
    /// # Errors
    /// - `KeyNotFound` if `finder` has no key for the resource id.
    /// - `DecryptionFailed` on a bad first header or chunk.
    pub async fn create<F: KeyFinder>(source: R, finder: &F) -> Result<Self> {
        let mut input = StreamInput::new(source);
        let header = read_chunk_header(&mut input).await?;
        let key = require_key(finder, &header.resource_id).await?;
        debug!(
            resource_id = %header.resource_id,
            version = header.version,
            chunk_size = header.encrypted_chunk_size,
            "chunk decryption stream"
        );

        let mut stream = Self::from_parts(input, ChunkDecryptor::new(header, key));
        stream.fill().await?;
        Ok(stream)
    }

    pub fn resource_id(&self) -> SimpleResourceId {
        self.processor().header.resource_id
    }

    pub fn symmetric_key(&self) -> SymmetricKey {
        self.processor().key
    }
}

impl<R: AsyncRead + Unpin> SessionDecryptionStream<R> {
    /// Read the session header, resolve the key (session key first, then
    /// the individual resource key) and decrypt the first chunk.
    pub async fn create<F: KeyFinder>(source: R, finder: &F) -> Result<Self> {
        let mut input = StreamInput::new(source);
        let buf = read_header(&mut input, SessionHeader::LEN).await?;
        let header = decode_session_header(buf).map_err(|e| Error::decryption(e.to_string()))?;
        let key = require_session_key(finder, &header.resource_id).await?;
        debug!(
            resource_id = %header.resource_id,
            chunk_size = header.encrypted_chunk_size,
            "session decryption stream"
        );

        let mut stream = Self::from_parts(input, SessionDecryptor::new(header, key));
        stream.fill().await?;
        Ok(stream)
    }

    pub fn resource_id(&self) -> CompositeResourceId {
        self.processor().header.resource_id
    }

    /// Subkey of this resource (not the session key).
    pub fn symmetric_key(&self) -> SymmetricKey {
        self.processor().key
    }
}
