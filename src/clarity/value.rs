use std::collections::BTreeMap;

use super::DecodeError;
use crate::crypto::c32::HASH160_LEN;

// Clarity consensus type prefixes
pub const TAG_INT: u8 = 0x00;
pub const TAG_UINT: u8 = 0x01;
pub const TAG_BUFFER: u8 = 0x02;
pub const TAG_TRUE: u8 = 0x03;
pub const TAG_FALSE: u8 = 0x04;
pub const TAG_STANDARD_PRINCIPAL: u8 = 0x05;
pub const TAG_CONTRACT_PRINCIPAL: u8 = 0x06;
pub const TAG_RESPONSE_OK: u8 = 0x07;
pub const TAG_RESPONSE_ERR: u8 = 0x08;
pub const TAG_NONE: u8 = 0x09;
pub const TAG_SOME: u8 = 0x0a;
pub const TAG_LIST: u8 = 0x0b;
pub const TAG_TUPLE: u8 = 0x0c;
pub const TAG_STRING_ASCII: u8 = 0x0d;
pub const TAG_STRING_UTF8: u8 = 0x0e;

const MAX_NESTING_DEPTH: usize = 32;

/// A Clarity value as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Int(i128),
    UInt(u128),
    Bool(bool),
    Buffer(Vec<u8>),
    StandardPrincipal {
        version: u8,
        hash160: [u8; HASH160_LEN],
    },
    ContractPrincipal {
        version: u8,
        hash160: [u8; HASH160_LEN],
        name: String,
    },
    ResponseOk(Box<WireValue>),
    ResponseErr(Box<WireValue>),
    OptionalNone,
    OptionalSome(Box<WireValue>),
    List(Vec<WireValue>),
    Tuple(BTreeMap<String, WireValue>),
    StringAscii(String),
    StringUtf8(String),
}

impl WireValue {
    /// Parses a `0x`-prefixed hex string holding exactly one serialized value.
    pub fn from_hex(input: &str) -> Result<Self, DecodeError> {
        let body = input
            .trim()
            .strip_prefix("0x")
            .ok_or_else(|| DecodeError::InvalidFormat(format!("missing 0x prefix: {input:?}")))?;
        let bytes = hex::decode(body)
            .map_err(|e| DecodeError::InvalidFormat(format!("bad hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor { bytes, pos: 0 };
        let value = cursor.read_value(0)?;
        if cursor.pos != bytes.len() {
            return Err(DecodeError::InvalidFormat(format!(
                "{} trailing bytes after value",
                bytes.len() - cursor.pos
            )));
        }
        Ok(value)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            WireValue::Int(_) => "int",
            WireValue::UInt(_) => "uint",
            WireValue::Bool(_) => "bool",
            WireValue::Buffer(_) => "buffer",
            WireValue::StandardPrincipal { .. } => "standard-principal",
            WireValue::ContractPrincipal { .. } => "contract-principal",
            WireValue::ResponseOk(_) => "ok",
            WireValue::ResponseErr(_) => "err",
            WireValue::OptionalNone => "none",
            WireValue::OptionalSome(_) => "some",
            WireValue::List(_) => "list",
            WireValue::Tuple(_) => "tuple",
            WireValue::StringAscii(_) => "string-ascii",
            WireValue::StringUtf8(_) => "string-utf8",
        }
    }

    /// Strips `(ok ...)` and `(some ...)` wrappers. `(err ...)` is an error.
    pub fn unwrap_ok(&self) -> Result<&WireValue, DecodeError> {
        let mut current = self;
        loop {
            match current {
                WireValue::ResponseOk(inner) | WireValue::OptionalSome(inner) => current = inner,
                WireValue::ResponseErr(inner) => {
                    return Err(DecodeError::InvalidFormat(format!(
                        "contract returned (err {})",
                        inner.type_name()
                    )))
                }
                other => return Ok(other),
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.unwrap_ok(), Ok(WireValue::OptionalNone))
    }

    pub fn field(&self, name: &str) -> Option<&WireValue> {
        match self.unwrap_ok().ok()? {
            WireValue::Tuple(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Result<u128, DecodeError> {
        match self.unwrap_ok()? {
            WireValue::UInt(value) => Ok(*value),
            other => Err(DecodeError::UnexpectedType {
                expected: "uint",
                found: other.type_name(),
            }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        match self.unwrap_ok()? {
            WireValue::Bool(value) => Ok(*value),
            other => Err(DecodeError::UnexpectedType {
                expected: "bool",
                found: other.type_name(),
            }),
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                DecodeError::InvalidFormat(format!(
                    "truncated input: need {} bytes at offset {}, have {}",
                    len,
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn read_16(&mut self) -> Result<[u8; 16], DecodeError> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn read_hash160(&mut self) -> Result<[u8; HASH160_LEN], DecodeError> {
        let mut buf = [0u8; HASH160_LEN];
        buf.copy_from_slice(self.take(HASH160_LEN)?);
        Ok(buf)
    }

    fn read_name(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u8()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| DecodeError::InvalidFormat("name is not valid utf-8".to_string()))
    }

    fn read_value(&mut self, depth: usize) -> Result<WireValue, DecodeError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::InvalidFormat("value nested too deeply".to_string()));
        }

        let tag = self.read_u8()?;
        let value = match tag {
            TAG_INT => WireValue::Int(i128::from_be_bytes(self.read_16()?)),
            TAG_UINT => WireValue::UInt(u128::from_be_bytes(self.read_16()?)),
            TAG_BUFFER => {
                let len = self.read_u32()? as usize;
                WireValue::Buffer(self.take(len)?.to_vec())
            }
            TAG_TRUE => WireValue::Bool(true),
            TAG_FALSE => WireValue::Bool(false),
            TAG_STANDARD_PRINCIPAL => WireValue::StandardPrincipal {
                version: self.read_u8()?,
                hash160: self.read_hash160()?,
            },
            TAG_CONTRACT_PRINCIPAL => WireValue::ContractPrincipal {
                version: self.read_u8()?,
                hash160: self.read_hash160()?,
                name: self.read_name()?,
            },
            TAG_RESPONSE_OK => WireValue::ResponseOk(Box::new(self.read_value(depth + 1)?)),
            TAG_RESPONSE_ERR => WireValue::ResponseErr(Box::new(self.read_value(depth + 1)?)),
            TAG_NONE => WireValue::OptionalNone,
            TAG_SOME => WireValue::OptionalSome(Box::new(self.read_value(depth + 1)?)),
            TAG_LIST => {
                let len = self.read_u32()? as usize;
                // Each element is at least one byte; don't trust the header for allocation.
                let mut items = Vec::with_capacity(len.min(self.bytes.len() - self.pos));
                for _ in 0..len {
                    items.push(self.read_value(depth + 1)?);
                }
                WireValue::List(items)
            }
            TAG_TUPLE => {
                let len = self.read_u32()? as usize;
                let mut fields = BTreeMap::new();
                for _ in 0..len {
                    let name = self.read_name()?;
                    let value = self.read_value(depth + 1)?;
                    fields.insert(name, value);
                }
                WireValue::Tuple(fields)
            }
            TAG_STRING_ASCII | TAG_STRING_UTF8 => {
                let len = self.read_u32()? as usize;
                let text = String::from_utf8(self.take(len)?.to_vec())
                    .map_err(|_| DecodeError::InvalidFormat("string is not valid utf-8".to_string()))?;
                if tag == TAG_STRING_ASCII {
                    WireValue::StringAscii(text)
                } else {
                    WireValue::StringUtf8(text)
                }
            }
            other => {
                return Err(DecodeError::InvalidFormat(format!(
                    "unknown type prefix 0x{other:02x}"
                )))
            }
        };
        Ok(value)
    }
}
