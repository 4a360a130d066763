use super::{value, DecodeError};
use crate::crypto::c32::c32_address_decode;

const MAX_CONTRACT_NAME_LEN: usize = 128;

/// `u<value>` as `0x01` + 16-byte big-endian magnitude.
pub fn encode_uint(value: u128) -> String {
    format!("0x{:02x}{}", value::TAG_UINT, hex::encode(value.to_be_bytes()))
}

/// Encodes `ADDRESS` or `ADDRESS.contract-name` as a principal argument.
pub fn encode_principal(principal: &str) -> Result<String, DecodeError> {
    let principal = principal.trim().trim_start_matches('\'');
    let (address, contract_name) = match principal.split_once('.') {
        Some((address, name)) => (address, Some(name)),
        None => (principal, None),
    };

    let (version, hash160) = c32_address_decode(address)
        .map_err(|e| DecodeError::InvalidFormat(format!("bad address {address:?}: {e}")))?;

    match contract_name {
        None => Ok(format!(
            "0x{:02x}{:02x}{}",
            value::TAG_STANDARD_PRINCIPAL,
            version,
            hex::encode(hash160)
        )),
        Some(name) => {
            if name.is_empty() || name.len() > MAX_CONTRACT_NAME_LEN || !name.is_ascii() {
                return Err(DecodeError::InvalidFormat(format!(
                    "bad contract name {name:?}"
                )));
            }
            Ok(format!(
                "0x{:02x}{:02x}{}{:02x}{}",
                value::TAG_CONTRACT_PRINCIPAL,
                version,
                hex::encode(hash160),
                name.len(),
                hex::encode(name)
            ))
        }
    }
}
