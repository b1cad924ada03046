//! Simplified NDN TLV (Type-Length-Value) encoding and decoding.
//!
//! Status traffic only ever uses the handful of packet-level elements below,
//! so TLV types fit in a single byte; lengths use the standard NDN
//! variable-width scheme.

use crate::error::Error;
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const TLV_INTEREST: u8 = 0x05;
pub const TLV_DATA: u8 = 0x06;
pub const TLV_NAME: u8 = 0x07;
pub const TLV_COMPONENT: u8 = 0x08;
pub const TLV_NONCE: u8 = 0x0A;
pub const TLV_INTEREST_LIFETIME: u8 = 0x0C;

/// Encode the variable-width TLV *length* field.
///
/// * `< 253` -> 1 byte
/// * `<= 65 535` -> marker 253 + 2-byte length
/// * otherwise -> marker 254 + 4-byte length
pub fn put_length(length: usize, buf: &mut BytesMut) {
    if length < 253 {
        buf.put_u8(length as u8);
    } else if length <= 65_535 {
        buf.put_u8(253);
        buf.put_u16(length as u16);
    } else {
        buf.put_u8(254);
        buf.put_u32(length as u32);
    }
}

/// Decode the TLV *length* field using NDN variable-length rules.
pub fn take_length(buf: &mut impl Buf) -> Result<usize, Error> {
    if !buf.has_remaining() {
        return Err(Error::Tlv("buffer underflow when decoding TLV length".into()));
    }

    match buf.get_u8() {
        marker @ 0..=252 => Ok(marker as usize),
        253 => {
            if buf.remaining() < 2 {
                return Err(Error::Tlv("buffer underflow when decoding 16-bit TLV length".into()));
            }
            Ok(buf.get_u16() as usize)
        }
        254 => {
            if buf.remaining() < 4 {
                return Err(Error::Tlv("buffer underflow when decoding 32-bit TLV length".into()));
            }
            Ok(buf.get_u32() as usize)
        }
        255 => Err(Error::Tlv("64-bit TLV lengths not supported".into())),
    }
}

/// A generic TLV element: a one-byte type plus its raw value bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TlvElement {
    pub tlv_type: u8,
    pub value: Bytes,
}

impl TlvElement {
    /// Create a new element from raw parts.
    pub fn new(tlv_type: u8, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            value: value.into(),
        }
    }

    /// Total number of bytes this element occupies when encoded.
    pub fn encoded_len(&self) -> usize {
        1 + length_width(self.value.len()) + self.value.len()
    }

    /// Append this element to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tlv_type);
        put_length(self.value.len(), buf);
        buf.extend_from_slice(&self.value);
    }

    /// Decode a single element from `buf` in-place.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        if buf.remaining() < 2 {
            return Err(Error::Tlv("buffer too small for TLV header".into()));
        }

        let tlv_type = buf.get_u8();
        let length = take_length(buf)?;

        if buf.remaining() < length {
            return Err(Error::Tlv(format!(
                "TLV value requires {} bytes but only {} available",
                length,
                buf.remaining()
            )));
        }

        // bytes 1.*: cheap zero-copy slice
        let value = buf.copy_to_bytes(length);
        Ok(Self { tlv_type, value })
    }

    /// Fail unless the element carries the expected type.
    pub fn expect_type(&self, tlv_type: u8) -> Result<(), Error> {
        if self.tlv_type != tlv_type {
            return Err(Error::Tlv(format!(
                "expected TLV type {:#04x}, got {:#04x}",
                tlv_type, self.tlv_type
            )));
        }
        Ok(())
    }
}

/// Number of bytes the variable-width scheme needs for `length`.
fn length_width(length: usize) -> usize {
    if length < 253 {
        1
    } else if length <= 65_535 {
        3
    } else {
        5
    }
}
