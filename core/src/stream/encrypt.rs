// ## 📂 File: `src/stream/encrypt.rs`

//! Chunked encryption streams.
//!
//! - v4: `[header][ciphertext][tag]` per chunk, no associated data.
//! - v8: same framing, every chunk ends with its own `0x80` sentinel and the
//!   chunk header is the associated data. Padding zeros spill into trailing
//!   chunks when needed.
//! - v11: one session header, then `[padding size u32][zeros][data]` chunks
//!   sealed under a subkey of the session key.
//!
//! Chunk IVs are `derive_iv(seed, index)` with a running index; chunks must
//! be produced in order.

use byteorder::{ByteOrder, LittleEndian};
use futures::io::AsyncRead;
use tracing::{debug, trace};

use crate::config::EncryptionOptions;
use crate::constants::{versions, MAC_LEN, PADDING_BYTE};
use crate::crypto::{self, derive_iv, derive_subkey, session_iv, AeadIv, SymmetricKey};
use crate::formats::{v11, v4, v8};
use crate::headers::{encode_chunk_header, encode_session_header, ChunkHeader, SessionHeader};
use crate::padding::{padded_from_clear_size, Padding};
use crate::resource_id::{CompositeResourceId, SimpleResourceId, SubkeySeed};
use crate::stream::buffered::{BufferedStream, ChunkProcessor, StreamInput};
use crate::types::Result;

/// Seal one v4/v8 chunk into `output` with a fresh header.
fn seal_chunk(
    output: &mut Vec<u8>,
    header: &ChunkHeader,
    key: &SymmetricKey,
    index: u64,
    clear: &[u8],
    authenticate_header: bool,
) -> Result<()> {
    let encoded = encode_chunk_header(header);
    output.resize(ChunkHeader::LEN + crypto::encrypted_size(clear.len() as u64) as usize, 0);
    output[..ChunkHeader::LEN].copy_from_slice(&encoded);

    let ad: &[u8] = if authenticate_header { &encoded } else { &[] };
    let iv = derive_iv(&header.seed, index);
    crypto::encrypt_aead(key, &iv, &mut output[ChunkHeader::LEN..], clear, ad)?;
    Ok(())
}

/// v4 chunk encoder.
#[derive(Debug)]
pub struct ChunkEncryptor {
    resource_id: SimpleResourceId,
    key: SymmetricKey,
    encrypted_chunk_size: u32,
    chunk_index: u64,
}

impl ChunkProcessor for ChunkEncryptor {
    async fn process_input<R: AsyncRead + Unpin>(
        &mut self,
        input: &mut StreamInput<R>,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        let clear_chunk_size = self.encrypted_chunk_size as usize - v4::CHUNK_OVERHEAD;
        let clear = input.read_input_source(clear_chunk_size).await?;

        let header = ChunkHeader::new(v4::VERSION, self.encrypted_chunk_size, self.resource_id, AeadIv::random());
        seal_chunk(output, &header, &self.key, self.chunk_index, clear, false)?;
        trace!(index = self.chunk_index, clear_len = clear.len(), "v4 chunk sealed");
        self.chunk_index += 1;

        if input.is_input_end_of_stream() {
            input.end_output_stream();
        }
        Ok(())
    }
}

/// v8 chunk encoder.
#[derive(Debug)]
pub struct PaddedChunkEncryptor {
    resource_id: SimpleResourceId,
    key: SymmetricKey,
    encrypted_chunk_size: u32,
    padding: Padding,
    chunk_index: u64,
    /// Zeros still owed once the input has ended.
    padding_left: Option<u64>,
}

impl ChunkProcessor for PaddedChunkEncryptor {
    async fn process_input<R: AsyncRead + Unpin>(
        &mut self,
        input: &mut StreamInput<R>,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        let clear_chunk_size = self.encrypted_chunk_size as usize - v8::CHUNK_OVERHEAD;
        let mut clear = Vec::with_capacity(clear_chunk_size + 1);

        if self.padding_left.is_none() {
            clear.extend_from_slice(input.read_input_source(clear_chunk_size).await?);
            if clear.len() < clear_chunk_size {
                let total = self.chunk_index * clear_chunk_size as u64 + clear.len() as u64;
                self.padding_left = Some(padded_from_clear_size(total, self.padding) - 1 - total);
            }
        }
        let data_len = clear.len();
        clear.push(PADDING_BYTE);

        if let Some(left) = self.padding_left.as_mut() {
            let room = (clear_chunk_size - data_len) as u64;
            let pad = room.min(*left);
            clear.resize(clear.len() + pad as usize, 0x00);
            *left -= pad;
            if *left == 0 && clear.len() - 1 < clear_chunk_size {
                input.end_output_stream();
            }
        }

        let header = ChunkHeader::new(v8::VERSION, self.encrypted_chunk_size, self.resource_id, AeadIv::random());
        seal_chunk(output, &header, &self.key, self.chunk_index, &clear, true)?;
        trace!(index = self.chunk_index, clear_len = data_len, "v8 chunk sealed");
        self.chunk_index += 1;
        Ok(())
    }
}

/// v11 chunk encoder.
#[derive(Debug)]
pub struct SessionEncryptor {
    header: SessionHeader,
    session_key: SymmetricKey,
    subkey: SymmetricKey,
    associated_data: [u8; SessionHeader::LEN],
    iv_seed: AeadIv,
    padding: Padding,
    chunk_index: u64,
    padding_left: Option<u64>,
    wrote_header: bool,
}

impl ChunkProcessor for SessionEncryptor {
    async fn process_input<R: AsyncRead + Unpin>(
        &mut self,
        input: &mut StreamInput<R>,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        if !self.wrote_header {
            output.extend_from_slice(&encode_session_header(&self.header));
            self.wrote_header = true;
            return Ok(());
        }

        let clear_chunk_size = self.header.encrypted_chunk_size as usize - v11::CHUNK_OVERHEAD;
        let (mut plain, padding_size) = match self.padding_left {
            // Padding-only chunk.
            Some(left) => {
                let padding_size = (clear_chunk_size as u64).min(left);
                self.padding_left = Some(left - padding_size);
                (vec![0u8; v11::PADDING_SIZE_LEN + padding_size as usize], padding_size)
            }
            None => {
                let data = input.read_input_source(clear_chunk_size).await?;
                let mut padding_size = 0;
                if data.len() < clear_chunk_size {
                    let total = self.chunk_index * clear_chunk_size as u64 + data.len() as u64;
                    let left = padded_from_clear_size(total, self.padding) - total - 1;
                    padding_size = ((clear_chunk_size - data.len()) as u64).min(left);
                    self.padding_left = Some(left - padding_size);
                }
                let data_offset = v11::PADDING_SIZE_LEN + padding_size as usize;
                let mut plain = vec![0u8; data_offset + data.len()];
                plain[data_offset..].copy_from_slice(data);
                (plain, padding_size)
            }
        };
        // Never above the clear chunk size, which is below `u32::MAX`.
        LittleEndian::write_u32(&mut plain[..v11::PADDING_SIZE_LEN], padding_size as u32);

        let iv = derive_iv(&self.iv_seed, self.chunk_index);
        output.resize(crypto::encrypted_size(plain.len() as u64) as usize, 0);
        crypto::encrypt_aead(&self.subkey, &iv, output, &plain, &self.associated_data)?;
        trace!(index = self.chunk_index, padding_size, "v11 chunk sealed");
        self.chunk_index += 1;

        let last_chunk_is_short = plain.len() < self.header.encrypted_chunk_size as usize - MAC_LEN;
        if self.padding_left == Some(0) && last_chunk_is_short {
            input.end_output_stream();
        }
        Ok(())
    }
}

/// v4 encryption stream.
pub type EncryptionStreamV4<R> = BufferedStream<R, ChunkEncryptor>;
/// v8 encryption stream.
pub type EncryptionStreamV8<R> = BufferedStream<R, PaddedChunkEncryptor>;
/// v11 encryption stream.
pub type EncryptionStreamV11<R> = BufferedStream<R, SessionEncryptor>;

impl<R: AsyncRead + Unpin> EncryptionStreamV4<R> {
    /// Encrypt under a fresh resource id and key. `options.padding` is ignored.
    pub fn new(source: R, options: EncryptionOptions) -> Result<Self> {
        Self::with_key(source, SimpleResourceId::random(), SymmetricKey::random(), options)
    }

    pub fn with_key(
        source: R,
        resource_id: SimpleResourceId,
        key: SymmetricKey,
        options: EncryptionOptions,
    ) -> Result<Self> {
        options.validate(v4::CHUNK_OVERHEAD as u32)?;
        debug!(resource_id = %resource_id, chunk_size = options.encrypted_chunk_size, "v4 encryption stream");
        let processor = ChunkEncryptor {
            resource_id,
            key,
            encrypted_chunk_size: options.encrypted_chunk_size,
            chunk_index: 0,
        };
        Ok(Self::with_processor(source, processor))
    }

    pub fn resource_id(&self) -> SimpleResourceId {
        self.processor().resource_id
    }

    pub fn symmetric_key(&self) -> SymmetricKey {
        self.processor().key
    }
}

impl<R: AsyncRead + Unpin> EncryptionStreamV8<R> {
    /// Encrypt under a fresh resource id and key.
    pub fn new(source: R, options: EncryptionOptions) -> Result<Self> {
        Self::with_key(source, SimpleResourceId::random(), SymmetricKey::random(), options)
    }

    pub fn with_key(
        source: R,
        resource_id: SimpleResourceId,
        key: SymmetricKey,
        options: EncryptionOptions,
    ) -> Result<Self> {
        options.validate(v8::CHUNK_OVERHEAD as u32)?;
        debug!(
            resource_id = %resource_id,
            chunk_size = options.encrypted_chunk_size,
            padding = ?options.padding,
            "v8 encryption stream"
        );
        let processor = PaddedChunkEncryptor {
            resource_id,
            key,
            encrypted_chunk_size: options.encrypted_chunk_size,
            padding: options.padding,
            chunk_index: 0,
            padding_left: None,
        };
        Ok(Self::with_processor(source, processor))
    }

    pub fn resource_id(&self) -> SimpleResourceId {
        self.processor().resource_id
    }

    pub fn symmetric_key(&self) -> SymmetricKey {
        self.processor().key
    }
}

impl<R: AsyncRead + Unpin> EncryptionStreamV11<R> {
    /// Encrypt as a new resource of the session, under a fresh subkey seed.
    pub fn new(
        source: R,
        session_id: SimpleResourceId,
        session_key: SymmetricKey,
        options: EncryptionOptions,
    ) -> Result<Self> {
        Self::with_seed(source, session_id, session_key, SubkeySeed::random(), options)
    }

    pub fn with_seed(
        source: R,
        session_id: SimpleResourceId,
        session_key: SymmetricKey,
        seed: SubkeySeed,
        options: EncryptionOptions,
    ) -> Result<Self> {
        options.validate(v11::CHUNK_OVERHEAD as u32)?;
        let resource_id = CompositeResourceId::new_transparent_session_id(&session_id, &seed);
        debug!(resource_id = %resource_id, chunk_size = options.encrypted_chunk_size, "v11 encryption stream");
        let processor = SessionEncryptor {
            header: SessionHeader::new(versions::V11, options.encrypted_chunk_size, resource_id),
            session_key,
            subkey: derive_subkey(&session_key, &seed),
            associated_data: v11::make_mac_data(&session_id, &seed, options.encrypted_chunk_size),
            iv_seed: session_iv(&session_id),
            padding: options.padding,
            chunk_index: 0,
            padding_left: None,
            wrote_header: false,
        };
        Ok(Self::with_processor(source, processor))
    }

    pub fn resource_id(&self) -> CompositeResourceId {
        self.processor().header.resource_id
    }

    /// Session key, to be stored under the session id.
    pub fn symmetric_key(&self) -> SymmetricKey {
        self.processor().session_key
    }
}
