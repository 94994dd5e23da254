//! Syntactic checks for off-ledger references.
//!
//! A reference is accepted when it starts with an allow-listed scheme, has a
//! non-empty body, fits in [`MAX_REFERENCE_LEN`] bytes and contains only
//! printable, non-whitespace ASCII. References are never dereferenced.

use soroban_sdk::String;

use crate::Error;

pub const MAX_REFERENCE_LEN: usize = 256;

/// Recognised content-addressed schemes.
const ALLOWED_SCHEMES: [&[u8]; 3] = [b"ipfs://", b"ar://", b"ref://"];

pub fn validate_reference(reference: &String) -> Result<(), Error> {
    let len = reference.len() as usize;
    if len == 0 || len > MAX_REFERENCE_LEN {
        return Err(Error::InvalidReference);
    }

    let mut buf = [0u8; MAX_REFERENCE_LEN];
    let bytes = &mut buf[..len];
    reference.copy_into_slice(bytes);

    if !bytes.iter().all(|b| b.is_ascii_graphic()) {
        return Err(Error::InvalidReference);
    }

    let scheme_ok = ALLOWED_SCHEMES
        .iter()
        .any(|scheme| bytes.len() > scheme.len() && bytes.starts_with(scheme));
    if scheme_ok {
        Ok(())
    } else {
        Err(Error::InvalidReference)
    }
}
