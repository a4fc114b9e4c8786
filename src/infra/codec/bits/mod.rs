//! Bit-level access to CAN payloads.
//!
//! Vendor signals are laid out in Intel (little-endian) bit order: bit 0 is the
//! least significant bit of byte 0, bit 8 the least significant bit of byte 1,
//! and a field spanning a byte boundary continues into the low bits of the next
//! byte. Payloads are read by value from a byte array; a wider integer is never
//! aliased over the buffer.
use crate::error::{BitReaderError, BitWriterError};

/// Cursor-based reader extracting bit segments from a `&[u8]`.
pub struct BitReader<'a> {
    buffer: &'a [u8],
    /// Current index expressed as number of bits from the beginning.
    bit_cursor: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the start of the provided buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            bit_cursor: 0,
        }
    }

    /// Move the cursor to an absolute bit position.
    pub fn seek(&mut self, bit: usize) -> Result<&mut Self, BitReaderError> {
        let buffer_len_bits = self.buffer.len() * 8;
        if bit > buffer_len_bits {
            return Err(BitReaderError::OutOfBounds {
                asked: bit,
                available: buffer_len_bits,
            });
        }
        self.bit_cursor = bit;
        Ok(self)
    }

    /// Read `num_bits` bits starting at the cursor. `num_bits` must stay in [1, 32].
    pub fn read_u32(&mut self, num_bits: u8) -> Result<u32, BitReaderError> {
        if !(1..=32).contains(&num_bits) {
            return Err(BitReaderError::TooLongForType {
                max: 32,
                asked: num_bits,
            });
        }

        let buffer_len_bits = self.buffer.len() * 8;
        if self.bit_cursor + num_bits as usize > buffer_len_bits {
            return Err(BitReaderError::OutOfBounds {
                asked: num_bits as usize,
                available: buffer_len_bits - self.bit_cursor,
            });
        }

        let mut result: u32 = 0;
        let mut bits_read = 0usize;

        while bits_read < num_bits as usize {
            let position = self.bit_cursor + bits_read;
            let byte = self.buffer[position / 8];
            let offset = position % 8;

            let chunk = (8 - offset).min(num_bits as usize - bits_read);
            let mask = ((1u16 << chunk) - 1) as u8;
            result |= (((byte >> offset) & mask) as u32) << bits_read;

            bits_read += chunk;
        }

        self.bit_cursor += num_bits as usize;
        Ok(result)
    }

    /// Read up to 16 bits.
    pub fn read_u16(&mut self, num_bits: u8) -> Result<u16, BitReaderError> {
        if num_bits > 16 {
            return Err(BitReaderError::TooLongForType {
                max: 16,
                asked: num_bits,
            });
        }
        self.read_u32(num_bits).map(|val| val as u16)
    }

    /// Read a two's complement field of `num_bits` and sign-extend it.
    pub fn read_i16(&mut self, num_bits: u8) -> Result<i16, BitReaderError> {
        let raw = self.read_u16(num_bits)?;
        let shift = 16 - num_bits as u32;
        Ok(((raw << shift) as i16) >> shift)
    }
}

//==================================================================================BITWRITER

/// Cursor-based writer laying bit segments into a `&mut [u8]`.
/// Bits outside the written field are preserved.
pub struct BitWriter<'a> {
    buffer: &'a mut [u8],
    bit_cursor: usize,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at the start of the buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            bit_cursor: 0,
        }
    }

    /// Move the cursor to an absolute bit position.
    pub fn seek(&mut self, bit: usize) -> Result<&mut Self, BitWriterError> {
        let buffer_len_bits = self.buffer.len() * 8;
        if bit > buffer_len_bits {
            return Err(BitWriterError::OutOfBounds {
                asked: bit,
                available: buffer_len_bits,
            });
        }
        self.bit_cursor = bit;
        Ok(self)
    }

    /// Write the `num_bits` low bits of `value` at the cursor.
    pub fn write_u32(&mut self, value: u32, num_bits: u8) -> Result<(), BitWriterError> {
        if !(1..=32).contains(&num_bits) {
            return Err(BitWriterError::TooLongForType {
                max: 32,
                asked: num_bits,
            });
        }

        let buffer_len_bits = self.buffer.len() * 8;
        if self.bit_cursor + num_bits as usize > buffer_len_bits {
            return Err(BitWriterError::OutOfBounds {
                asked: num_bits as usize,
                available: buffer_len_bits - self.bit_cursor,
            });
        }

        let mut remaining = value;
        let mut bits_written = 0usize;

        while bits_written < num_bits as usize {
            let position = self.bit_cursor + bits_written;
            let index = position / 8;
            let offset = position % 8;

            let chunk = (8 - offset).min(num_bits as usize - bits_written);
            let mask = ((1u16 << chunk) - 1) as u8;
            self.buffer[index] &= !(mask << offset);
            self.buffer[index] |= (remaining as u8 & mask) << offset;
            remaining >>= chunk;

            bits_written += chunk;
        }

        self.bit_cursor += num_bits as usize;
        Ok(())
    }
}

//==================================================================================FIXED_PAYLOAD
/// Read a field from a full 8-byte payload.
///
/// Callers pass constant layouts that lie inside the 64 payload bits; an
/// out-of-range layout reads as zero rather than aborting a decode.
pub fn field(data: &[u8; 8], start_bit: usize, num_bits: u8) -> u32 {
    let mut reader = BitReader::new(data);
    match reader.seek(start_bit) {
        Ok(reader) => reader.read_u32(num_bits).unwrap_or(0),
        Err(_) => 0,
    }
}

/// Read a signed field from a full 8-byte payload (see [`field`]).
pub fn signed_field(data: &[u8; 8], start_bit: usize, num_bits: u8) -> i16 {
    let mut reader = BitReader::new(data);
    match reader.seek(start_bit) {
        Ok(reader) => reader.read_i16(num_bits).unwrap_or(0),
        Err(_) => 0,
    }
}

/// Write a field into a full 8-byte payload.
///
/// Layouts are constants of the encoder; an out-of-range one is a programming
/// error caught in debug builds and leaves the payload untouched in release.
pub fn set_field(data: &mut [u8; 8], start_bit: usize, num_bits: u8, value: u32) {
    let written = BitWriter::new(data)
        .seek(start_bit)
        .and_then(|writer| writer.write_u32(value, num_bits));
    debug_assert!(
        written.is_ok(),
        "field {}|{} outside the payload",
        start_bit,
        num_bits
    );
}
