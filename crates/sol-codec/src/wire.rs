//! Fixed-layout binary primitives used by the remote program.
//!
//! ```text
//! u8 / bool     1 byte (bool decodes any nonzero byte as true)
//! u64 / i64     8 bytes, little-endian, two's complement for i64
//! address       32 raw bytes
//! string        u32 LE byte length || UTF-8 bytes (no padding, no NUL)
//! option<T>     u8 tag (0 = none, 1 = some) || T when some
//! ```
//!
//! There are no variable-width integers anywhere in the layout. Decoding is
//! strictly sequential: a read that runs past the end of the buffer is an
//! error and nothing is ever zero-filled.

use crate::address::Address;
use crate::error::SolError;

/// Encode a `u64` as 8 little-endian bytes.
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Encode an `i64` as 8 little-endian two's-complement bytes.
pub fn encode_i64(value: i64) -> [u8; 8] {
    value.to_le_bytes()
}

pub fn encode_bool(value: bool) -> u8 {
    u8::from(value)
}

/// Encode a string as a 4-byte little-endian byte length followed by its
/// UTF-8 bytes.
///
/// The prefix counts bytes, not characters. Fails if the string is longer
/// than a `u32` can describe.
pub fn encode_string(value: &str) -> Result<Vec<u8>, SolError> {
    let bytes = value.as_bytes();
    let len = u32::try_from(bytes.len()).map_err(|_| {
        SolError::Encoding(format!(
            "string of {} bytes exceeds the u32 length prefix",
            bytes.len()
        ))
    })?;

    let mut out = Vec::with_capacity(4 + bytes.len());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(bytes);
    Ok(out)
}

/// Decode a length-prefixed string from the start of `buf`.
///
/// Returns the string and the number of bytes consumed.
pub fn decode_string(buf: &[u8]) -> Result<(String, usize), SolError> {
    let mut reader = WireReader::new(buf);
    let value = reader.read_string("string")?;
    Ok((value, reader.offset()))
}

/// Append-only payload writer.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a payload with an 8-byte discriminator.
    pub fn with_prefix(prefix: &[u8; 8]) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(prefix);
        Self { buf }
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(encode_bool(value));
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&encode_u64(value));
        self
    }

    pub fn put_i64(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&encode_i64(value));
        self
    }

    pub fn put_address(&mut self, address: &Address) -> &mut Self {
        self.buf.extend_from_slice(address.as_bytes());
        self
    }

    pub fn put_string(&mut self, value: &str) -> Result<&mut Self, SolError> {
        let encoded = encode_string(value)?;
        self.buf.extend_from_slice(&encoded);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Offset-tracking reader over an account buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Consume exactly `n` bytes or fail without advancing.
    pub fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], SolError> {
        if self.remaining() < n {
            return Err(SolError::ShortBuffer {
                field,
                offset: self.offset,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], SolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    /// Read the leading 8 bytes and require them to equal `expected`.
    pub fn expect_discriminator(
        &mut self,
        type_name: &'static str,
        expected: &[u8; 8],
    ) -> Result<(), SolError> {
        let found: [u8; 8] = self.take_array("discriminator")?;
        if &found != expected {
            return Err(SolError::DiscriminatorMismatch {
                type_name,
                expected: hex::encode(expected),
                found: hex::encode(found),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, SolError> {
        Ok(self.take(field, 1)?[0])
    }

    /// Any nonzero byte is `true`.
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, SolError> {
        Ok(self.read_u8(field)? != 0)
    }

    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, SolError> {
        Ok(u64::from_le_bytes(self.take_array(field)?))
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, SolError> {
        Ok(i64::from_le_bytes(self.take_array(field)?))
    }

    pub fn read_address(&mut self, field: &'static str) -> Result<Address, SolError> {
        Ok(Address::new(self.take_array(field)?))
    }

    /// Length-prefixed UTF-8. On any failure the offset is left where the
    /// prefix started.
    pub fn read_string(&mut self, field: &'static str) -> Result<String, SolError> {
        let start = self.offset;
        let result = self.read_string_body(field);
        if result.is_err() {
            self.offset = start;
        }
        result
    }

    fn read_string_body(&mut self, field: &'static str) -> Result<String, SolError> {
        let len = u32::from_le_bytes(self.take_array(field)?) as usize;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| SolError::InvalidValue {
            field,
            reason: format!("invalid utf-8: {e}"),
        })
    }

    /// Read a 1-byte option tag followed by the value when present.
    pub fn read_option<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> Result<T, SolError>,
    ) -> Result<Option<T>, SolError> {
        match self.read_u8(field)? {
            0 => Ok(None),
            1 => read(self).map(Some),
            tag => Err(SolError::InvalidValue {
                field,
                reason: format!("option tag must be 0 or 1, got {tag}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn u64_is_little_endian() {
        assert_eq!(encode_u64(1_000_000), [0x40, 0x42, 0x0f, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn i64_negative_is_twos_complement() {
        assert_eq!(encode_i64(-1), [0xff; 8]);
        assert_eq!(encode_i64(-2)[0], 0xfe);
    }

    #[test]
    fn string_prefix_counts_bytes_not_chars() {
        // "é" is one char but two UTF-8 bytes.
        let encoded = encode_string("é").unwrap();
        assert_eq!(&encoded[..4], &[2, 0, 0, 0]);
        assert_eq!(&encoded[4..], "é".as_bytes());
    }

    #[test]
    fn empty_string_is_just_a_zero_prefix() {
        assert_eq!(encode_string("").unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn decode_string_reports_consumed() {
        let mut buf = encode_string("UNFT").unwrap();
        buf.extend_from_slice(&[0xAA, 0xBB]);
        let (s, used) = decode_string(&buf).unwrap();
        assert_eq!(s, "UNFT");
        assert_eq!(used, 8);
    }

    #[test]
    fn decode_string_shorter_than_declared_fails() {
        let buf = [5u8, 0, 0, 0, b'a', b'b'];
        let err = decode_string(&buf).unwrap_err();
        assert!(matches!(
            err,
            SolError::ShortBuffer { needed: 5, available: 2, .. }
        ));
    }

    #[test]
    fn decode_string_missing_prefix_fails() {
        assert!(decode_string(&[1, 0]).is_err());
    }

    #[test]
    fn decode_string_rejects_invalid_utf8() {
        let buf = [2u8, 0, 0, 0, 0xff, 0xfe];
        assert!(matches!(
            decode_string(&buf),
            Err(SolError::InvalidValue { .. })
        ));
    }

    #[test]
    fn any_nonzero_byte_is_true() {
        let mut r = WireReader::new(&[0, 1, 2, 0xff]);
        assert!(!r.read_bool("a").unwrap());
        assert!(r.read_bool("b").unwrap());
        assert!(r.read_bool("c").unwrap());
        assert!(r.read_bool("d").unwrap());
        assert!(r.read_bool("e").is_err());
    }

    #[test]
    fn failed_take_does_not_advance() {
        let mut r = WireReader::new(&[1, 2, 3]);
        assert!(r.read_u64("x").is_err());
        assert_eq!(r.offset(), 0);
        assert_eq!(r.read_u8("y").unwrap(), 1);
    }

    #[test]
    fn failed_string_read_rewinds_to_the_prefix() {
        // Prefix claims 10 bytes, only 2 follow.
        let buf = [10, 0, 0, 0, b'h', b'i'];
        let mut r = WireReader::new(&buf);
        assert!(r.read_string("uri").is_err());
        assert_eq!(r.offset(), 0);
        assert_eq!(r.remaining(), buf.len());

        let mut bad = encode_string("ok").unwrap();
        bad[4] = 0xff;
        let mut r = WireReader::new(&bad);
        assert!(r.read_string("uri").is_err());
        assert_eq!(r.offset(), 0);
        assert_eq!(r.read_u8("len").unwrap(), 2);
    }

    #[test]
    fn discriminator_mismatch_is_reported() {
        let mut r = WireReader::new(&[0u8; 16]);
        let err = r.expect_discriminator("Thing", &[1u8; 8]).unwrap_err();
        assert!(matches!(
            err,
            SolError::DiscriminatorMismatch { type_name: "Thing", .. }
        ));
    }

    #[test]
    fn option_tags() {
        let mut w = WireWriter::new();
        w.put_u8(0).put_u8(1).put_u64(9).put_u8(2);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_option("a", |r| r.read_u64("a")).unwrap(), None);
        assert_eq!(r.read_option("b", |r| r.read_u64("b")).unwrap(), Some(9));
        assert!(r.read_option("c", |r| r.read_u64("c")).is_err());
    }

    #[test]
    fn writer_with_prefix_starts_with_it() {
        let mut w = WireWriter::with_prefix(&[9u8; 8]);
        w.put_bool(true);
        assert_eq!(w.len(), 9);
        assert_eq!(w.into_bytes(), [9, 9, 9, 9, 9, 9, 9, 9, 1]);
    }

    proptest! {
        #[test]
        fn primitives_round_trip(
            s in ".{0,64}",
            u in any::<u64>(),
            i in any::<i64>(),
            b in any::<bool>(),
            addr in any::<[u8; 32]>(),
        ) {
            let address = Address::new(addr);
            let mut w = WireWriter::new();
            w.put_string(&s).unwrap().put_u64(u).put_i64(i).put_bool(b).put_address(&address);
            let bytes = w.into_bytes();

            let mut r = WireReader::new(&bytes);
            prop_assert_eq!(r.read_string("s").unwrap(), s);
            prop_assert_eq!(r.read_u64("u").unwrap(), u);
            prop_assert_eq!(r.read_i64("i").unwrap(), i);
            prop_assert_eq!(r.read_bool("b").unwrap(), b);
            prop_assert_eq!(r.read_address("a").unwrap(), address);
            prop_assert_eq!(r.remaining(), 0);
        }

        #[test]
        fn every_truncation_of_a_string_fails(s in ".{1,32}") {
            let encoded = encode_string(&s).unwrap();
            for cut in 0..encoded.len() {
                prop_assert!(decode_string(&encoded[..cut]).is_err());
            }
        }
    }
}
