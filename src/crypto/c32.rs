//! Crockford-style base32 with a 4-byte double-SHA256 checksum, as used by
//! Stacks addresses (`S` + version char + c32(hash160 || checksum)).

use thiserror::Error;

use super::hash::checksum4;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

pub const HASH160_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum C32Error {
    #[error("invalid c32 character {0:?}")]
    InvalidCharacter(char),

    #[error("version {0} does not fit in a single c32 digit")]
    InvalidVersion(u8),

    #[error("address must start with 'S'")]
    MissingPrefix,

    #[error("payload too short")]
    TooShort,

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("expected a {HASH160_LEN}-byte hash, got {0} bytes")]
    BadHashLength(usize),
}

fn c32_digit(c: char) -> Result<u8, C32Error> {
    // Crockford normalisation: O->0, I/L->1, case-insensitive.
    let normalized = match c.to_ascii_uppercase() {
        'O' => '0',
        'I' | 'L' => '1',
        other => other,
    };
    C32_ALPHABET
        .iter()
        .position(|&d| d as char == normalized)
        .map(|idx| idx as u8)
        .ok_or(C32Error::InvalidCharacter(c))
}

pub fn c32_encode(input: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits = 0u32;

    for &byte in input.iter().rev() {
        carry |= (byte as u16) << carry_bits;
        carry_bits += 8;
        while carry_bits >= 5 {
            out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
            carry >>= 5;
            carry_bits -= 5;
        }
    }
    if carry_bits > 0 {
        out.push(C32_ALPHABET[(carry & 0x1f) as usize]);
    }

    // `out` is little-endian: trailing '0's are leading zeros of the number.
    while out.last() == Some(&b'0') {
        out.pop();
    }
    for _ in input.iter().take_while(|&&b| b == 0) {
        out.push(b'0');
    }
    out.reverse();

    out.into_iter().map(char::from).collect()
}

pub fn c32_decode(input: &str) -> Result<Vec<u8>, C32Error> {
    let digits = input
        .chars()
        .map(c32_digit)
        .collect::<Result<Vec<u8>, _>>()?;

    let mut out: Vec<u8> = Vec::with_capacity(digits.len() * 5 / 8 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits = 0u32;

    for &digit in digits.iter().rev() {
        carry |= (digit as u16) << carry_bits;
        carry_bits += 5;
        if carry_bits >= 8 {
            out.push((carry & 0xff) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 {
        out.push(carry as u8);
    }

    while out.last() == Some(&0) {
        out.pop();
    }
    for _ in digits.iter().take_while(|&&d| d == 0) {
        out.push(0);
    }
    out.reverse();

    Ok(out)
}

pub fn c32check_encode(version: u8, data: &[u8]) -> Result<String, C32Error> {
    if version as usize >= C32_ALPHABET.len() {
        return Err(C32Error::InvalidVersion(version));
    }

    let mut preimage = Vec::with_capacity(data.len() + 1);
    preimage.push(version);
    preimage.extend_from_slice(data);
    let checksum = checksum4(&preimage);

    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum);

    let mut encoded = String::with_capacity(payload.len() * 2);
    encoded.push(C32_ALPHABET[version as usize] as char);
    encoded.push_str(&c32_encode(&payload));
    Ok(encoded)
}

pub fn c32check_decode(input: &str) -> Result<(u8, Vec<u8>), C32Error> {
    let mut chars = input.chars();
    let version = c32_digit(chars.next().ok_or(C32Error::TooShort)?)?;
    let payload = c32_decode(chars.as_str())?;
    if payload.len() < 4 {
        return Err(C32Error::TooShort);
    }

    let (data, checksum) = payload.split_at(payload.len() - 4);
    let mut preimage = Vec::with_capacity(data.len() + 1);
    preimage.push(version);
    preimage.extend_from_slice(data);
    if checksum4(&preimage) != checksum {
        return Err(C32Error::BadChecksum);
    }

    Ok((version, data.to_vec()))
}

/// Renders a standard principal `(version, hash160)` as a Stacks address.
pub fn c32_address(version: u8, hash160: &[u8; HASH160_LEN]) -> Result<String, C32Error> {
    Ok(format!("S{}", c32check_encode(version, hash160)?))
}

/// Parses a Stacks address back into `(version, hash160)`.
pub fn c32_address_decode(address: &str) -> Result<(u8, [u8; HASH160_LEN]), C32Error> {
    let body = address
        .strip_prefix('S')
        .or_else(|| address.strip_prefix('s'))
        .ok_or(C32Error::MissingPrefix)?;
    let (version, data) = c32check_decode(body)?;
    let hash: [u8; HASH160_LEN] = data
        .as_slice()
        .try_into()
        .map_err(|_| C32Error::BadHashLength(data.len()))?;
    Ok((version, hash))
}
