#[cfg(test)]
mod tests {
    use envelope_core::stream::{read_all, read_stream, PeekableInputSource};
    use futures::io::{AsyncReadExt, Cursor};
    use pollster::block_on;

    #[test]
    fn peek_does_not_consume() {
        let mut source = PeekableInputSource::new(Cursor::new(b"hello world".to_vec()));
        assert_eq!(block_on(source.peek(5)).unwrap(), b"hello");
        assert_eq!(block_on(source.peek(1)).unwrap(), b"h");
        assert_eq!(block_on(read_all(&mut source)).unwrap(), b"hello world");
    }

    #[test]
    fn peek_past_the_end() {
        let mut source = PeekableInputSource::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(block_on(source.peek(10)).unwrap(), b"abc");
        assert_eq!(block_on(source.peek(10)).unwrap(), b"abc");
        assert_eq!(block_on(read_all(&mut source)).unwrap(), b"abc");
        assert!(block_on(source.peek(1)).unwrap().is_empty());
    }

    #[test]
    fn peek_after_partial_read() {
        let mut source = PeekableInputSource::new(Cursor::new(b"0123456789".to_vec()));
        assert_eq!(block_on(source.peek(4)).unwrap(), b"0123");

        let mut buf = [0u8; 2];
        block_on(source.read_exact(&mut buf)).unwrap();
        assert_eq!(&buf, b"01");
        assert_eq!(block_on(source.peek(4)).unwrap(), b"2345");

        let mut rest = [0u8; 8];
        assert_eq!(block_on(read_stream(&mut source, &mut rest)).unwrap(), 8);
        assert_eq!(&rest, b"23456789");
    }

    #[test]
    fn empty_source() {
        let mut source = PeekableInputSource::new(Cursor::new(Vec::new()));
        assert!(block_on(source.peek(1)).unwrap().is_empty());
        let inner = source.into_inner();
        assert_eq!(inner.position(), 0);
    }

    #[test]
    fn read_stream_fills_across_short_reads() {
        // Each peek/read pair hands out bytes in separate pieces.
        let mut source = PeekableInputSource::new(Cursor::new((0u8..100).collect::<Vec<u8>>()));
        assert_eq!(block_on(source.peek(3)).unwrap(), &[0, 1, 2]);
        let mut buf = [0u8; 50];
        assert_eq!(block_on(read_stream(&mut source, &mut buf)).unwrap(), 50);
        assert_eq!(buf.to_vec(), (0u8..50).collect::<Vec<u8>>());

        let mut tail = [0u8; 80];
        assert_eq!(block_on(read_stream(&mut source, &mut tail)).unwrap(), 50);
        assert_eq!(tail[..50].to_vec(), (50u8..100).collect::<Vec<u8>>());
    }
}
