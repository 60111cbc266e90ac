// ## 📂 File: `src/stream/buffered.rs`

//! Generic buffered transform.
//!
//! A `ChunkProcessor` turns input into one chunk of output per call; the
//! `BufferedStream` owns the input source, the output buffer and the read
//! cursor, and serves the buffer to the caller across as many `read` calls
//! as needed.
//!
//! States:
//! - `NoOutput`: nothing buffered, the next `read` processes input.
//! - `BufferedOutput`: serving bytes from the buffer.
//! - `EndOfStream`: input exhausted and everything delivered.
//! - `Error`: terminal, every `read` fails.

use std::io;

use futures::io::{AsyncRead, AsyncReadExt};
use tracing::{trace, warn};

use crate::types::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    NoOutput,
    BufferedOutput,
    EndOfStream,
    Error,
}

/// Input side of a stream, as seen by processors.
#[derive(Debug)]
pub struct StreamInput<R> {
    source: Option<R>,
    buffer: Vec<u8>,
    processing_complete: bool,
}

impl<R: AsyncRead + Unpin> StreamInput<R> {
    pub fn new(source: R) -> Self {
        Self { source: Some(source), buffer: Vec::new(), processing_complete: false }
    }

    /// Read `size` bytes, fewer only at end of input. A short read drops the
    /// source: later calls return an empty slice without touching it.
    ///
    /// `size` may come from an unauthenticated header, so the buffer only
    /// grows with the bytes actually received.
    pub async fn read_input_source(&mut self, size: usize) -> Result<&[u8]> {
        self.buffer.clear();
        let Some(source) = self.source.as_mut() else {
            return Ok(&self.buffer);
        };

        let total = source.take(size as u64).read_to_end(&mut self.buffer).await?;
        if total < size {
            self.source = None;
        }
        Ok(&self.buffer)
    }

    /// True once a short read has been seen.
    #[inline]
    pub fn is_input_end_of_stream(&self) -> bool {
        self.source.is_none()
    }

    /// Mark the current chunk as the last one.
    pub fn end_output_stream(&mut self) {
        self.processing_complete = true;
        self.source = None;
    }

    #[inline]
    pub fn is_processing_complete(&self) -> bool {
        self.processing_complete
    }

    fn drop_source(&mut self) {
        self.source = None;
    }
}

/// One step of a chunked codec.
#[allow(async_fn_in_trait)]
pub trait ChunkProcessor {
    /// Consume input for one chunk and write the resulting bytes to `output`
    /// (empty on entry). Call `input.end_output_stream()` on the last chunk.
    async fn process_input<R: AsyncRead + Unpin>(
        &mut self,
        input: &mut StreamInput<R>,
        output: &mut Vec<u8>,
    ) -> Result<()>;
}

/// Pull-based stream over a `ChunkProcessor`.
#[derive(Debug)]
pub struct BufferedStream<R, P> {
    input: StreamInput<R>,
    processor: P,
    output: Vec<u8>,
    position: usize,
    state: State,
}

impl<R: AsyncRead + Unpin, P: ChunkProcessor> BufferedStream<R, P> {
    pub fn with_processor(source: R, processor: P) -> Self {
        Self::from_parts(StreamInput::new(source), processor)
    }

    /// Resume from an input that already had bytes consumed (headers read
    /// before the processor could be built).
    pub fn from_parts(input: StreamInput<R>, processor: P) -> Self {
        Self { input, processor, output: Vec::new(), position: 0, state: State::NoOutput }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Copy up to `out.len()` bytes of output. `Ok(0)` means end of stream
    /// (or an empty `out`).
    pub async fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        match self.state {
            State::EndOfStream => return Ok(0),
            State::Error => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::Other,
                    "buffered stream is in an error state",
                )))
            }
            State::NoOutput => self.fill().await?,
            State::BufferedOutput => {}
        }
        Ok(self.copy_buffered_output(out))
    }

    /// Read everything left.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = vec![0u8; 64 * 1024];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    /// Fill `out` from the stream and return the number of bytes written.
    ///
    /// # Errors
    /// `InvalidArgument` if the stream holds more than `out.len()` bytes.
    pub async fn read_into(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut pos = 0;
        while pos < out.len() {
            let n = self.read(&mut out[pos..]).await?;
            if n == 0 {
                return Ok(pos);
            }
            pos += n;
        }
        let mut probe = [0u8; 1];
        if self.read(&mut probe).await? != 0 {
            return Err(Error::InvalidArgument("output buffer too small for stream content".into()));
        }
        Ok(pos)
    }

    /// Process input until some output is buffered or the stream ends.
    /// Any failure is terminal.
    pub(crate) async fn fill(&mut self) -> Result<()> {
        loop {
            self.output.clear();
            if let Err(e) = self.processor.process_input(&mut self.input, &mut self.output).await {
                warn!(error = %e, "stream processing failed");
                self.input.drop_source();
                self.output.clear();
                self.state = State::Error;
                return Err(e);
            }
            self.position = 0;
            trace!(len = self.output.len(), complete = self.input.is_processing_complete(), "chunk processed");
            if !self.output.is_empty() {
                self.state = State::BufferedOutput;
                return Ok(());
            }
            if self.input.is_processing_complete() {
                self.state = State::EndOfStream;
                return Ok(());
            }
        }
    }

    fn copy_buffered_output(&mut self, out: &mut [u8]) -> usize {
        let to_read = out.len().min(self.output.len() - self.position);
        out[..to_read].copy_from_slice(&self.output[self.position..self.position + to_read]);
        self.position += to_read;
        if self.position == self.output.len() {
            self.state = if self.input.is_processing_complete() {
                State::EndOfStream
            } else {
                State::NoOutput
            };
        }
        to_read
    }
}
