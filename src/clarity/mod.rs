//! Clarity value handling for read-only contract calls: wire parsing,
//! typed decoding with safe defaults, and argument encoding.

pub mod decode;
pub mod encode;
pub mod value;

pub use decode::{AddressEncoder, C32Encoder, ClarityDecoder, Kind, NativeValue, Principal};
pub use value::WireValue;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("value exceeds 128-bit unsigned range")]
    Overflow,

    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
}
