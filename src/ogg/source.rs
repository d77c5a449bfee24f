// Byte sources a page can be decoded from
//
// Three shapes are supported: a seekable file cursor, a plain sequential
// stream, and an in-memory buffer. The decoder only sees the trait.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::utils::io::{discard, read_fully};

/// Minimal read capability the page decoder needs from its input
pub trait PageSource {
    /// Whether any bytes remain at the cursor.
    ///
    /// `None` means the source cannot tell without reading.
    fn remaining_hint(&mut self) -> std::io::Result<Option<bool>>;

    /// Fill as much of `buf` as the source can; a short count means the
    /// source has ended.
    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Move the cursor forward by up to `count` bytes, returning how far it went
    fn skip(&mut self, count: u64) -> std::io::Result<u64>;

    /// Byte offset of the cursor within the wrapped input.
    ///
    /// Seekable and in-memory sources report the absolute offset, so a
    /// source that starts mid-input does not start at 0. A stream cannot
    /// know what came before it and counts bytes consumed since it was
    /// wrapped.
    fn position(&mut self) -> std::io::Result<u64>;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn remaining_hint(&mut self) -> std::io::Result<Option<bool>> {
        (**self).remaining_hint()
    }

    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        (**self).read_full(buf)
    }

    fn skip(&mut self, count: u64) -> std::io::Result<u64> {
        (**self).skip(count)
    }

    fn position(&mut self) -> std::io::Result<u64> {
        (**self).position()
    }
}

/// Random-access cursor over anything seekable, usually a file.
///
/// Reads go through a [`BufReader`]. The end of the input is measured
/// against the underlying reader on every check, so bytes appended between
/// decodes are picked up.
#[derive(Debug)]
pub struct FileSource<R> {
    inner: BufReader<R>,
}

impl FileSource<File> {
    /// Open a file for page decoding, starting at offset 0
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(FileSource::new(File::open(path)?))
    }
}

impl<R: Read + Seek> FileSource<R> {
    /// Decode from the reader's current position
    pub fn new(inner: R) -> Self {
        FileSource {
            inner: BufReader::new(inner),
        }
    }

    /// The underlying reader; its cursor may sit past [`PageSource::position`]
    /// by whatever was buffered
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// Current end of the input, leaving the buffered cursor where it was
    fn end(&mut self) -> std::io::Result<u64> {
        let raw = self.inner.get_mut();
        let pos = raw.stream_position()?;
        let end = raw.seek(SeekFrom::End(0))?;
        if pos != end {
            raw.seek(SeekFrom::Start(pos))?;
        }
        Ok(end)
    }
}

impl<R: Read + Seek> PageSource for FileSource<R> {
    fn remaining_hint(&mut self) -> std::io::Result<Option<bool>> {
        let pos = self.inner.stream_position()?;
        Ok(Some(pos < self.end()?))
    }

    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        read_fully(&mut self.inner, buf)
    }

    fn skip(&mut self, count: u64) -> std::io::Result<u64> {
        let pos = self.inner.stream_position()?;
        let end = self.end()?;
        let step = count.min(end.saturating_sub(pos));
        let offset = i64::try_from(step)
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "skip too large"))?;
        // Keeps whatever part of the buffer is still ahead of the cursor
        self.inner.seek_relative(offset)?;
        Ok(step)
    }

    fn position(&mut self) -> std::io::Result<u64> {
        self.inner.stream_position()
    }
}

/// Forward-only stream such as a socket or pipe
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        StreamSource { inner, consumed: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> PageSource for StreamSource<R> {
    fn remaining_hint(&mut self) -> std::io::Result<Option<bool>> {
        Ok(None)
    }

    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = read_fully(&mut self.inner, buf)?;
        self.consumed += read as u64;
        Ok(read)
    }

    fn skip(&mut self, count: u64) -> std::io::Result<u64> {
        let skipped = discard(&mut self.inner, count)?;
        self.consumed += skipped;
        Ok(skipped)
    }

    fn position(&mut self) -> std::io::Result<u64> {
        Ok(self.consumed)
    }
}

/// In-memory buffer with an explicit cursor
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { data, offset: 0 }
    }

    /// Start decoding at `offset`; an offset past the end behaves like the end
    pub fn with_offset(data: &'a [u8], offset: usize) -> Self {
        SliceSource {
            data,
            offset: offset.min(data.len()),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes after the cursor
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}

impl PageSource for SliceSource<'_> {
    fn remaining_hint(&mut self) -> std::io::Result<Option<bool>> {
        Ok(Some(self.offset < self.data.len()))
    }

    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let available = self.remaining();
        let n = buf.len().min(available.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }

    fn skip(&mut self, count: u64) -> std::io::Result<u64> {
        let n = count.min(self.remaining().len() as u64);
        self.offset += n as usize;
        Ok(n)
    }

    fn position(&mut self) -> std::io::Result<u64> {
        Ok(self.offset as u64)
    }
}
