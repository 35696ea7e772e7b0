//! Byte-level reader and writer for the transaction wire encoding.
//!
//! `ByteWriter` implements `HashWriter`, so the wire encoding and the
//! hashing preimages lay fields out through the same code. All integers
//! are little-endian and all lengths are u64.

use crate::hash::HashWriter;
use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor-based reader over an encoded byte slice.
///
/// Wraps a byte slice and maintains a read position, providing methods
/// to read fixed-size little-endian integers and length-prefixed byte strings.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader over the given byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from.
    ///
    /// # Returns
    /// A `ByteReader` positioned at the start of the data.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or an error if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size array and advance the position.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a u64 collection length, rejecting lengths that cannot fit in
    /// the remaining data given a minimum per-item size.
    ///
    /// # Arguments
    /// * `min_item_size` - Smallest possible encoded size of one item.
    ///
    /// # Returns
    /// The decoded length, or `LengthTooLarge` if it overruns the buffer.
    pub fn read_len(&mut self, min_item_size: usize) -> Result<usize, PrimitivesError> {
        let len = self.read_u64()?;
        let needed = len.checked_mul(min_item_size.max(1) as u64);
        match needed {
            Some(n) if n <= self.remaining() as u64 => Ok(len as usize),
            _ => Err(PrimitivesError::LengthTooLarge(len)),
        }
    }

    /// Read a u64-length-prefixed byte string.
    ///
    /// # Returns
    /// The bytes following the length prefix.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_len(1)?;
        self.read_bytes(len)
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// A growable buffer that accepts protocol fields through `HashWriter`.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl HashWriter for ByteWriter {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        self.buf.extend_from_slice(data.as_ref());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_writer_roundtrip() {
        let mut writer = ByteWriter::new();
        writer
            .write_u8(0x42)
            .write_u16(0x1234)
            .write_u32(0xDEADBEEF)
            .write_u64(0x0102030405060708)
            .write_var_bytes(b"hello");

        let data = writer.into_bytes();
        assert_eq!(data.len(), 1 + 2 + 4 + 8 + 8 + 5);
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_u64().unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_var_bytes().unwrap(), b"hello");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut writer = ByteWriter::new();
        writer.write_u16(1).write_var_bytes(&[0xab]);
        assert_eq!(
            writer.as_bytes(),
            &[0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 0xab]
        );
    }

    #[test]
    fn test_reader_eof() {
        let mut reader = ByteReader::new(&[0x01]);
        assert!(reader.read_u8().is_ok());
        assert!(matches!(reader.read_u8(), Err(PrimitivesError::UnexpectedEof)));
    }

    #[test]
    fn test_oversized_length_prefix_rejected() {
        let mut writer = ByteWriter::new();
        writer.write_u64(u64::MAX).update([0u8; 4]);
        let data = writer.into_bytes();
        let mut reader = ByteReader::new(&data);
        assert!(matches!(
            reader.read_var_bytes(),
            Err(PrimitivesError::LengthTooLarge(u64::MAX))
        ));
    }

    #[test]
    fn test_read_len_respects_item_size() {
        let mut writer = ByteWriter::new();
        writer.write_u64(2).update([0u8; 10]);
        let data = writer.into_bytes();
        assert_eq!(ByteReader::new(&data).read_len(5).unwrap(), 2);
        assert!(ByteReader::new(&data).read_len(6).is_err());
    }
}
