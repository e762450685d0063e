use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, ReadBytesExt};

use crate::errors::*;

/// Read a fixed size string
pub trait ReadStringExt: Read {
    /// Read the fixed size string, dropping the null padding
    fn read_fixed_size_string(&mut self, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];

        self.read_exact(&mut buf)?;

        let end = buf.iter().position(|&b| b == 0).unwrap_or(len);

        buf.truncate(end);

        Ok(String::from_utf8(buf)?)
    }
}

impl<R: Read + ?Sized> ReadStringExt for R {}

/// A seekable byte source which knows its total length.
///
/// The fixed width reads don't check anything by themselves; callers first
/// `ensure` the span they are about to consume, choosing the error that fits
/// the structure being read.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> BoundedReader<R> {
    /// Wrap the source, measuring its length and rewinding it to the start.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;

        inner.seek(SeekFrom::Start(0))?;

        Ok(BoundedReader { inner, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::Current(0))?)
    }

    /// Bytes left between the current position and the end of the source.
    pub fn remaining(&mut self) -> Result<u64> {
        let pos = self.position()?;

        Ok(self.len.saturating_sub(pos))
    }

    /// Fail with `err(size, position)` unless `size` bytes are left.
    pub fn ensure<F>(&mut self, size: usize, err: F) -> Result<()>
    where
        F: FnOnce(usize, u64) -> MachError,
    {
        let pos = self.position()?;

        if pos + size as u64 > self.len {
            Err(err(size, pos))
        } else {
            Ok(())
        }
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;

        Ok(())
    }

    pub fn skip(&mut self, size: usize) -> Result<()> {
        self.inner.seek(SeekFrom::Current(size as i64))?;

        Ok(())
    }

    pub fn read_u32<O: ByteOrder>(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<O>()?)
    }

    pub fn read_i32<O: ByteOrder>(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<O>()?)
    }

    pub fn read_u64<O: ByteOrder>(&mut self) -> Result<u64> {
        Ok(self.inner.read_u64::<O>()?)
    }

    pub fn read_fixed_size_string(&mut self, len: usize) -> Result<String> {
        self.inner.read_fixed_size_string(len)
    }

    pub fn read_bytes(&mut self, size: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; size];

        self.inner.read_exact(&mut buf)?;

        Ok(buf)
    }

    /// Read `size` bytes at the absolute `offset`, leaving the current position untouched.
    ///
    /// The region must end strictly before the last byte of the source,
    /// an `offset + size` equal to the source length is rejected as well.
    pub fn read_region(&mut self, name: &str, offset: u64, size: u64) -> Result<Vec<u8>> {
        let len = self.len;
        let out_of_range = || MachError::OutOfRange {
            name: name.to_owned(),
            offset,
            size,
            len,
        };

        if offset >= len {
            return Err(out_of_range());
        }

        match offset.checked_add(size) {
            Some(end) if end < len => {}
            _ => return Err(out_of_range()),
        }

        let saved = self.position()?;

        trace!("read region `{}` at 0x{:x} with {} bytes", name, offset, size);

        self.seek_to(offset)?;

        let buf = self.read_bytes(size as usize);

        self.seek_to(saved)?;

        buf
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
