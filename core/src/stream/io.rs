// ## 📂 File: `src/stream/io.rs`
// ## Input sources for the streaming engine

//! Any `futures::io::AsyncRead + Unpin` is an input source. A read of zero
//! bytes is end of input; short reads are not errors.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::io::{AsyncRead, AsyncReadExt};

/// Read until `buf` is full or the source reaches end of input.
/// Returns the number of bytes read.
pub async fn read_stream<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        let n = reader.read(&mut buf[off..]).await?;
        if n == 0 {
            break;
        }
        off += n;
    }
    Ok(off)
}

/// Drain a source into memory.
pub async fn read_all<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await?;
    Ok(out)
}

/// Source wrapper that can look ahead without consuming.
///
/// Peeked bytes are served first by subsequent reads.
#[derive(Debug)]
pub struct PeekableInputSource<R> {
    inner: R,
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: AsyncRead + Unpin> PeekableInputSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, buffer: Vec::new(), pos: 0 }
    }

    /// Up to `size` upcoming bytes; fewer only at end of input.
    pub async fn peek(&mut self, size: usize) -> io::Result<&[u8]> {
        if self.pos > 0 {
            self.buffer.drain(..self.pos);
            self.pos = 0;
        }
        let have = self.buffer.len();
        if have < size {
            self.buffer.resize(size, 0);
            match read_stream(&mut self.inner, &mut self.buffer[have..]).await {
                Ok(n) => self.buffer.truncate(have + n),
                Err(e) => {
                    self.buffer.truncate(have);
                    return Err(e);
                }
            }
        }
        Ok(&self.buffer[..size.min(self.buffer.len())])
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for PeekableInputSource<R> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.pos < this.buffer.len() {
            let n = buf.len().min(this.buffer.len() - this.pos);
            buf[..n].copy_from_slice(&this.buffer[this.pos..this.pos + n]);
            this.pos += n;
            if this.pos == this.buffer.len() {
                this.buffer.clear();
                this.pos = 0;
            }
            return Poll::Ready(Ok(n));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

/// Type-erased input source.
pub type InputSource<'a> = Box<dyn AsyncRead + Unpin + Send + 'a>;
