// I/O utilities shared by the page sources and the decoder

use std::io::{ErrorKind, Read};

/// Read until `buf` is full or the reader reports end of input.
///
/// Returns the number of bytes placed in `buf`; anything short of
/// `buf.len()` means the reader ran out. Interrupted reads are retried.
pub fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Discard up to `count` bytes from a reader that cannot seek
pub fn discard<R: Read + ?Sized>(reader: &mut R, count: u64) -> std::io::Result<u64> {
    let mut skip_buf = [0u8; 8192];
    let mut remaining = count;
    while remaining > 0 {
        let to_read = remaining.min(skip_buf.len() as u64) as usize;
        let read = read_fully(reader, &mut skip_buf[..to_read])?;
        remaining -= read as u64;
        if read < to_read {
            break;
        }
    }
    Ok(count - remaining)
}

/// Little-endian 32-bit integer at `offset`
pub fn le_u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut buffer = [0u8; 4];
    buffer.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buffer)
}

/// Little-endian signed 64-bit integer at `offset`
pub fn le_i64_at(bytes: &[u8], offset: usize) -> i64 {
    let mut buffer = [0u8; 8];
    buffer.copy_from_slice(&bytes[offset..offset + 8]);
    i64::from_le_bytes(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `chunk` bytes per call and fails once with Interrupted
    struct Dribble {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        interrupted: bool,
    }

    impl Read for Dribble {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_fully_across_short_reads() {
        let mut reader = Dribble { data: (0..20).collect(), pos: 0, chunk: 3, interrupted: false };
        let mut buf = [0u8; 16];
        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 16);
        assert_eq!(buf[15], 15);

        let mut rest = [0u8; 16];
        assert_eq!(read_fully(&mut reader, &mut rest).unwrap(), 4);
    }

    #[test]
    fn test_discard() {
        let mut cursor = Cursor::new(vec![0u8; 10_000]);
        assert_eq!(discard(&mut cursor, 9_000).unwrap(), 9_000);
        assert_eq!(discard(&mut cursor, 9_000).unwrap(), 1_000);
        assert_eq!(discard(&mut cursor, 1).unwrap(), 0);
    }

    #[test]
    fn test_little_endian_fields() {
        let bytes = [0xff, 0x01, 0x00, 0x00, 0x80, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(le_u32_at(&bytes, 0), 0x1ff);
        assert_eq!(le_i64_at(&bytes, 4), -128);
        assert_eq!(le_i64_at(&[0xff; 8], 0), -1);
    }
}
