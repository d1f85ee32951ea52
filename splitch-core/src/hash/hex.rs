use std::io::{Error, ErrorKind};

/// Decode a hex digest of exactly `N` bytes, ignoring surrounding whitespace and case.
pub fn parse_hex_array<const N: usize>(hex_str: &str) -> std::io::Result<[u8; N]> {
    let mut out = [0u8; N];
    let bytes = hex::decode(hex_str.trim())
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("invalid hex: {e}")))?;
    if bytes.len() != N {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("expected {N} bytes ({} hex chars), got {}", N * 2, bytes.len()),
        ));
    }
    out.copy_from_slice(&bytes);
    Ok(out)
}
