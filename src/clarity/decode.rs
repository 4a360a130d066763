use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::{value::WireValue, DecodeError};
use crate::crypto::c32::{c32_address, c32_address_decode, HASH160_LEN};

/// The native kind a caller expects a read-only result to decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    UInt,
    Bool,
    Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Principal {
    /// Fully rendered address; contract principals are `ADDRESS.name`.
    Address(String),
    /// Wire principal that no encoder could render. Never substituted with a guess.
    Undecoded {
        version: u8,
        hash160: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        contract_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeValue {
    UInt(u128),
    Bool(bool),
    Principal(Principal),
}

/// Renders `(version, hash160)` into a checksummed address string.
pub trait AddressEncoder: Send + Sync {
    fn encode_address(&self, version: u8, hash160: &[u8; HASH160_LEN]) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct C32Encoder;

impl AddressEncoder for C32Encoder {
    fn encode_address(&self, version: u8, hash160: &[u8; HASH160_LEN]) -> Option<String> {
        c32_address(version, hash160).ok()
    }
}

/// Result payload shapes, in decoding precedence order.
enum RawResult<'a> {
    Wire(&'a str),
    Repr(&'a str),
    Number(&'a serde_json::Number),
    Boolean(bool),
}

impl<'a> RawResult<'a> {
    fn classify(payload: &'a Value) -> Result<Self, DecodeError> {
        match payload {
            Value::String(text) if text.trim_start().starts_with("0x") => Ok(RawResult::Wire(text)),
            Value::String(text) => Ok(RawResult::Repr(text)),
            Value::Number(number) => Ok(RawResult::Number(number)),
            Value::Bool(flag) => Ok(RawResult::Boolean(*flag)),
            other => Err(DecodeError::InvalidFormat(format!(
                "unsupported result shape: {other}"
            ))),
        }
    }
}

/// Accepts `{okay, result}`, `{result}` or a bare scalar.
fn extract_payload(body: &Value) -> Result<&Value, DecodeError> {
    let Value::Object(map) = body else {
        return Ok(body);
    };
    if let Some(Value::Bool(false)) = map.get("okay") {
        let cause = map
            .get("cause")
            .and_then(Value::as_str)
            .unwrap_or("unknown cause");
        return Err(DecodeError::InvalidFormat(format!(
            "read-only call failed: {cause}"
        )));
    }
    map.get("result")
        .ok_or_else(|| DecodeError::InvalidFormat("response has no result field".to_string()))
}

fn strip_repr_wrappers(text: &str) -> Result<&str, DecodeError> {
    let mut current = text.trim();
    loop {
        if current.starts_with("(err ") {
            return Err(DecodeError::InvalidFormat(format!(
                "contract returned {current}"
            )));
        }
        let Some(inner) = current
            .strip_prefix("(ok ")
            .or_else(|| current.strip_prefix("(some "))
        else {
            return Ok(current);
        };
        current = inner
            .strip_suffix(')')
            .ok_or_else(|| DecodeError::InvalidFormat(format!("unbalanced repr: {text}")))?
            .trim();
    }
}

fn parse_uint_repr(text: &str) -> Result<u128, DecodeError> {
    let digits = text.strip_prefix('u').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidFormat(format!("not a uint: {text:?}")));
    }
    digits.parse::<u128>().map_err(|_| DecodeError::Overflow)
}

/// `0x`-prefixed numeric string such as `0x3e8`; at most 128 bits.
fn parse_hex_uint(text: &str) -> Option<u128> {
    let digits = text.trim().strip_prefix("0x")?;
    if digits.is_empty() || digits.len() > 32 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u128::from_str_radix(digits, 16).ok()
}

fn parse_bool_repr(text: &str) -> Result<bool, DecodeError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DecodeError::InvalidFormat(format!("not a bool: {other:?}"))),
    }
}

fn parse_principal_repr(text: &str) -> Result<Principal, DecodeError> {
    let address = text.strip_prefix('\'').unwrap_or(text);
    let standard = address.split('.').next().unwrap_or(address);
    c32_address_decode(standard)
        .map_err(|e| DecodeError::InvalidFormat(format!("not a principal {address:?}: {e}")))?;
    Ok(Principal::Address(address.to_string()))
}

#[derive(Clone)]
pub struct ClarityDecoder {
    encoder: Option<Arc<dyn AddressEncoder>>,
}

impl Default for ClarityDecoder {
    fn default() -> Self {
        Self::new(Arc::new(C32Encoder))
    }
}

impl ClarityDecoder {
    pub fn new(encoder: Arc<dyn AddressEncoder>) -> Self {
        Self {
            encoder: Some(encoder),
        }
    }

    /// Principals decode to `Principal::Undecoded`.
    #[cfg(test)]
    pub fn without_encoder() -> Self {
        Self { encoder: None }
    }

    /// Decodes a raw `0x` Clarity hex string into the expected native kind.
    pub fn decode(&self, hex: &str, kind: Kind) -> Result<NativeValue, DecodeError> {
        match WireValue::from_hex(hex) {
            Ok(wire) => self.native_from_wire(&wire, kind),
            // A uint may also come back as a plain hex number (`0x3e8`).
            Err(err) => match kind {
                Kind::UInt => parse_hex_uint(hex).map(NativeValue::UInt).ok_or(err),
                _ => Err(err),
            },
        }
    }

    pub fn native_from_wire(&self, wire: &WireValue, kind: Kind) -> Result<NativeValue, DecodeError> {
        match kind {
            Kind::UInt => wire.as_uint().map(NativeValue::UInt),
            Kind::Bool => wire.as_bool().map(NativeValue::Bool),
            Kind::Principal => self.principal_from_wire(wire).map(NativeValue::Principal),
        }
    }

    pub fn principal_from_wire(&self, wire: &WireValue) -> Result<Principal, DecodeError> {
        match wire.unwrap_ok()? {
            WireValue::StandardPrincipal { version, hash160 } => {
                Ok(self.render_principal(*version, hash160, None))
            }
            WireValue::ContractPrincipal {
                version,
                hash160,
                name,
            } => Ok(self.render_principal(*version, hash160, Some(name))),
            other => Err(DecodeError::UnexpectedType {
                expected: "principal",
                found: other.type_name(),
            }),
        }
    }

    fn render_principal(
        &self,
        version: u8,
        hash160: &[u8; HASH160_LEN],
        contract_name: Option<&str>,
    ) -> Principal {
        let encoded = self
            .encoder
            .as_ref()
            .and_then(|encoder| encoder.encode_address(version, hash160));
        match (encoded, contract_name) {
            (Some(address), Some(name)) => Principal::Address(format!("{address}.{name}")),
            (Some(address), None) => Principal::Address(address),
            (None, name) => Principal::Undecoded {
                version,
                hash160: hex::encode(hash160),
                contract_name: name.map(str::to_string),
            },
        }
    }

    /// Decodes a read-only call response body. Precedence: wire hex, then
    /// (uint only) a plain `0x` hex number when the bytes are not a valid wire
    /// value, then textual repr (`u12`, `true`, `(ok ...)`, `'ST...`), then
    /// bare JSON scalar.
    pub fn decode_result(&self, body: &Value, kind: Kind) -> Result<NativeValue, DecodeError> {
        let payload = extract_payload(body)?;
        match RawResult::classify(payload)? {
            RawResult::Wire(hex) => self.decode(hex, kind),
            RawResult::Repr(text) => {
                let text = strip_repr_wrappers(text)?;
                match kind {
                    Kind::UInt => parse_uint_repr(text).map(NativeValue::UInt),
                    Kind::Bool => parse_bool_repr(text).map(NativeValue::Bool),
                    Kind::Principal => parse_principal_repr(text).map(NativeValue::Principal),
                }
            }
            RawResult::Number(number) => match kind {
                Kind::UInt => match number.as_u64() {
                    Some(value) => Ok(NativeValue::UInt(u128::from(value))),
                    // Integers past u64 arrive as f64; the exact value is already lost.
                    None => match number.as_f64() {
                        Some(f) if f >= 0.0 && f.fract() == 0.0 => Err(DecodeError::Overflow),
                        _ => Err(DecodeError::InvalidFormat(format!(
                            "not a non-negative integer: {number}"
                        ))),
                    },
                },
                _ => Err(DecodeError::UnexpectedType {
                    expected: kind_name(kind),
                    found: "number",
                }),
            },
            RawResult::Boolean(flag) => match kind {
                Kind::Bool => Ok(NativeValue::Bool(flag)),
                _ => Err(DecodeError::UnexpectedType {
                    expected: kind_name(kind),
                    found: "bool",
                }),
            },
        }
    }

    /// Parses the response body as a full wire value (tuples, optionals).
    pub fn wire_result(&self, body: &Value) -> Result<WireValue, DecodeError> {
        match extract_payload(body)? {
            Value::String(hex) => WireValue::from_hex(hex),
            other => Err(DecodeError::InvalidFormat(format!(
                "expected hex result, got {other}"
            ))),
        }
    }

    pub fn uint_or_default(&self, body: &Value, context: &str) -> u128 {
        match self.decode_result(body, Kind::UInt) {
            Ok(NativeValue::UInt(value)) => value,
            Ok(other) => {
                tracing::warn!("{} decoded to unexpected {:?}, using 0", context, other);
                0
            }
            Err(err) => {
                tracing::warn!("{} decode failed, using 0: {}", context, err);
                0
            }
        }
    }

    pub fn bool_or_default(&self, body: &Value, context: &str) -> bool {
        match self.decode_result(body, Kind::Bool) {
            Ok(NativeValue::Bool(value)) => value,
            Ok(other) => {
                tracing::warn!("{} decoded to unexpected {:?}, using false", context, other);
                false
            }
            Err(err) => {
                tracing::warn!("{} decode failed, using false: {}", context, err);
                false
            }
        }
    }

    pub fn principal_or_none(&self, body: &Value, context: &str) -> Option<Principal> {
        match self.decode_result(body, Kind::Principal) {
            Ok(NativeValue::Principal(principal)) => Some(principal),
            Ok(other) => {
                tracing::warn!("{} decoded to unexpected {:?}", context, other);
                None
            }
            Err(err) => {
                tracing::warn!("{} decode failed: {}", context, err);
                None
            }
        }
    }
}

fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::UInt => "uint",
        Kind::Bool => "bool",
        Kind::Principal => "principal",
    }
}
