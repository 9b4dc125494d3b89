//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Strict binary protocol.
//!
//! All integers are big-endian. Structs are a sequence of
//! `type (1 byte), id (i16), value` fields ended by a `0x00` type byte;
//! strings and binaries are an `i32` length followed by the bytes; lists
//! and sets are an element type byte and an `i32` size; maps are key and
//! value type bytes and an `i32` size.
//!
//! A strict envelope starts with `VERSION_1 | call type` as an `i32`,
//! followed by the method name and the sequence number. The older form
//! (name first, then a type byte) is accepted on read unless strict reads
//! are required.

use crate::protocol::{
    ProtocolReader, ProtocolWriter, TFieldIdentifier, TListIdentifier, TMapIdentifier, TMessageIdentifier,
    TSetIdentifier, TStructIdentifier, TType,
};
use crate::serialization::{CodecError, DEFAULT_MAX_CONTAINER_LEN};
use std::io::{self, Read, Write};

/// Version marker of the strict envelope.
pub const VERSION_1: u32 = 0x8001_0000;

const VERSION_MASK: u32 = 0xFFFF_0000;

/// Writes the strict binary protocol to a stream.
#[derive(Debug)]
pub struct BinaryOutputProtocol<W: Write> {
    out: W,
    strict: bool,
}

impl<W: Write> BinaryOutputProtocol<W> {
    /// Creates a protocol writing to `out`. `strict` selects the versioned
    /// envelope.
    pub fn new(out: W, strict: bool) -> Self {
        Self { out, strict }
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = i32::try_from(len).map_err(|_| CodecError::LimitExceeded {
            what: "length",
            limit: i32::MAX as usize,
        })?;
        self.write_i32(len)
    }
}

impl<W: Write> ProtocolWriter for BinaryOutputProtocol<W> {
    fn write_message_begin(&mut self, identifier: &TMessageIdentifier) -> Result<(), CodecError> {
        if self.strict {
            let header = VERSION_1 | u32::from(identifier.message_type);
            self.write_i32(header as i32)?;
            self.write_string(&identifier.name)?;
        } else {
            self.write_string(&identifier.name)?;
            self.write_byte(identifier.message_type as i8)?;
        }
        self.write_i32(identifier.sequence)
    }

    fn write_message_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _identifier: &TStructIdentifier) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_field_begin(&mut self, identifier: &TFieldIdentifier) -> Result<(), CodecError> {
        self.out.write_all(&[identifier.field_type.id()])?;
        self.write_i16(identifier.id)
    }

    fn write_field_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), CodecError> {
        self.out.write_all(&[TType::Stop.id()])?;
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.out.write_all(&[u8::from(value)])?;
        Ok(())
    }

    fn write_byte(&mut self, value: i8) -> Result<(), CodecError> {
        self.out.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.out.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.out.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<(), CodecError> {
        self.out.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<(), CodecError> {
        self.out.write_all(&value.to_bits().to_be_bytes())?;
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.write_binary(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), CodecError> {
        self.write_len(value.len())?;
        self.out.write_all(value)?;
        Ok(())
    }

    fn write_list_begin(&mut self, identifier: &TListIdentifier) -> Result<(), CodecError> {
        self.out.write_all(&[identifier.element_type.id()])?;
        self.write_len(identifier.size)
    }

    fn write_list_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_set_begin(&mut self, identifier: &TSetIdentifier) -> Result<(), CodecError> {
        self.out.write_all(&[identifier.element_type.id()])?;
        self.write_len(identifier.size)
    }

    fn write_set_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn write_map_begin(&mut self, identifier: &TMapIdentifier) -> Result<(), CodecError> {
        self.out.write_all(&[identifier.key_type.id(), identifier.value_type.id()])?;
        self.write_len(identifier.size)
    }

    fn write_map_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CodecError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Reads the strict binary protocol from a stream.
#[derive(Debug)]
pub struct BinaryInputProtocol<R: Read> {
    input: R,
    strict: bool,
    max_len: usize,
}

impl<R: Read> BinaryInputProtocol<R> {
    /// Creates a protocol reading from `input`. `strict` rejects envelopes
    /// without a version marker.
    pub fn new(input: R, strict: bool) -> Self {
        Self {
            input,
            strict,
            max_len: DEFAULT_MAX_CONTAINER_LEN,
        }
    }

    /// Limits string lengths and container sizes.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.input
    }

    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn ttype(&mut self) -> Result<TType, CodecError> {
        let [id] = self.bytes::<1>()?;
        TType::from_u8(id).ok_or_else(|| CodecError::malformed(format!("invalid type id {id}")))
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.read_i32()?;
        let len = usize::try_from(len).map_err(|_| CodecError::malformed(format!("negative length {len}")))?;
        if len > self.max_len {
            return Err(CodecError::LimitExceeded {
                what: "length",
                limit: self.max_len,
            });
        }
        Ok(len)
    }

    fn read_exact_vec(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::with_capacity(len.min(64 * 1024));
        (&mut self.input).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "string truncated").into());
        }
        Ok(bytes)
    }

    fn utf8(bytes: Vec<u8>) -> Result<String, CodecError> {
        String::from_utf8(bytes).map_err(|e| CodecError::malformed(format!("invalid UTF-8: {e}")))
    }
}

impl<R: Read> ProtocolReader for BinaryInputProtocol<R> {
    fn read_message_begin(&mut self) -> Result<TMessageIdentifier, CodecError> {
        let header = self.read_i32()?;
        if header < 0 {
            let version = header as u32 & VERSION_MASK;
            if version != VERSION_1 {
                return Err(CodecError::malformed(format!("bad protocol version 0x{version:08x}")));
            }
            let name = self.read_string()?;
            let sequence = self.read_i32()?;
            return Ok(TMessageIdentifier {
                name,
                message_type: (header & 0xFF) as u8,
                sequence,
            });
        }
        if self.strict {
            return Err(CodecError::malformed("missing protocol version in strict mode"));
        }
        let len = header as usize;
        if len > self.max_len {
            return Err(CodecError::LimitExceeded {
                what: "length",
                limit: self.max_len,
            });
        }
        let name = Self::utf8(self.read_exact_vec(len)?)?;
        let message_type = self.read_byte()? as u8;
        let sequence = self.read_i32()?;
        Ok(TMessageIdentifier {
            name,
            message_type,
            sequence,
        })
    }

    fn read_message_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<Option<TStructIdentifier>, CodecError> {
        Ok(None)
    }

    fn read_struct_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<TFieldIdentifier, CodecError> {
        let field_type = self.ttype()?;
        if field_type == TType::Stop {
            return Ok(TFieldIdentifier::stop());
        }
        let id = self.read_i16()?;
        Ok(TFieldIdentifier::new("", field_type, id))
    }

    fn read_field_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, CodecError> {
        let [byte] = self.bytes::<1>()?;
        Ok(byte != 0)
    }

    fn read_byte(&mut self) -> Result<i8, CodecError> {
        Ok(i8::from_be_bytes(self.bytes()?))
    }

    fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_be_bytes(self.bytes()?))
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.bytes()?))
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.bytes()?))
    }

    fn read_double(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.bytes()?)))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        let bytes = self.read_binary()?;
        Self::utf8(bytes)
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_len()?;
        self.read_exact_vec(len)
    }

    fn read_list_begin(&mut self) -> Result<TListIdentifier, CodecError> {
        let element_type = self.ttype()?;
        let size = self.read_len()?;
        Ok(TListIdentifier { element_type, size })
    }

    fn read_list_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<TSetIdentifier, CodecError> {
        let element_type = self.ttype()?;
        let size = self.read_len()?;
        Ok(TSetIdentifier { element_type, size })
    }

    fn read_set_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<TMapIdentifier, CodecError> {
        let key_type = self.ttype()?;
        let value_type = self.ttype()?;
        let size = self.read_len()?;
        Ok(TMapIdentifier {
            key_type,
            value_type,
            size,
        })
    }

    fn read_map_end(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut BinaryOutputProtocol<&mut Vec<u8>>)) -> String {
        let mut out = Vec::new();
        f(&mut BinaryOutputProtocol::new(&mut out, true));
        hex::encode(out)
    }

    #[test]
    fn test_big_endian_primitives() {
        assert_eq!(written(|p| p.write_i16(-2).unwrap()), "fffe");
        assert_eq!(written(|p| p.write_i32(300).unwrap()), "0000012c");
        assert_eq!(written(|p| p.write_double(1.0).unwrap()), "3ff0000000000000");
        assert_eq!(written(|p| p.write_string("ab").unwrap()), "000000026162");
    }

    #[test]
    fn test_strict_envelope() {
        let header = TMessageIdentifier {
            name: "add".to_string(),
            message_type: 1,
            sequence: 7,
        };
        let bytes = written(|p| p.write_message_begin(&header).unwrap());
        assert_eq!(bytes, "800100010000000361646400000007");

        let raw = hex::decode(bytes).unwrap();
        let mut input = BinaryInputProtocol::new(&raw[..], true);
        assert_eq!(input.read_message_begin().unwrap(), header);
    }

    #[test]
    fn test_old_envelope() {
        let header = TMessageIdentifier {
            name: "add".to_string(),
            message_type: 2,
            sequence: 1,
        };
        let mut out = Vec::new();
        BinaryOutputProtocol::new(&mut out, false)
            .write_message_begin(&header)
            .unwrap();
        assert_eq!(hex::encode(&out), "000000036164640200000001");

        let lenient = BinaryInputProtocol::new(&out[..], false).read_message_begin().unwrap();
        assert_eq!(lenient, header);
        assert!(BinaryInputProtocol::new(&out[..], true).read_message_begin().is_err());
    }

    #[test]
    fn test_negative_length_rejected() {
        let raw = hex::decode("ffffffff").unwrap();
        let error = BinaryInputProtocol::new(&raw[..], true).read_binary().unwrap_err();
        assert!(matches!(error, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_skip_nested_struct() {
        // struct { 1: list<i32> [5], 2: struct { 1: "x" } } followed by an i16.
        let raw = hex::decode("0f00010800000001000000050c00020b0001000000017800000007").unwrap();
        let mut input = BinaryInputProtocol::new(&raw[..], true);
        input.skip(TType::Struct, 8).unwrap();
        assert_eq!(input.read_i16().unwrap(), 7);
    }
}
