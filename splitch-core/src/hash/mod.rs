use crate::error::{Result, SplitchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

pub mod blake3;
pub mod hex;
pub mod sha256;

/// Both algorithms produce 32-byte digests.
pub const DIGEST_LEN: usize = 32;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgo {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgo {
    pub fn hasher(self) -> Box<dyn Digester> {
        match self {
            HashAlgo::Sha256 => Box::new(sha256::Sha256Digester::default()),
            HashAlgo::Blake3 => Box::new(blake3::Blake3Digester::default()),
        }
    }
}

impl fmt::Display for HashAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HashAlgo::Sha256 => "sha256",
            HashAlgo::Blake3 => "blake3",
        })
    }
}

impl FromStr for HashAlgo {
    type Err = SplitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgo::Sha256),
            "blake3" => Ok(HashAlgo::Blake3),
            other => Err(SplitchError::invalid(format!("unknown hash algorithm: {other}"))),
        }
    }
}

pub trait Digester {
    fn update(&mut self, buf: &[u8]);
    fn finalize_hex(self: Box<Self>) -> String;
}

/// Outcome of comparing a file against its recorded digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    Verified { digest: String },
    Mismatch { expected: String, actual: String },
}

impl Verification {
    pub fn compare(expected: String, actual: String) -> Self {
        if actual == expected {
            Verification::Verified { digest: actual }
        } else {
            Verification::Mismatch { expected, actual }
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified { .. })
    }
}

pub fn digest_reader(algo: HashAlgo, src: &mut dyn Read) -> std::io::Result<String> {
    let mut hasher = algo.hasher();
    let mut buf = vec![0u8; 1 << 16];
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize_hex())
}

pub fn digest_bytes(algo: HashAlgo, bytes: &[u8]) -> String {
    let mut hasher = algo.hasher();
    hasher.update(bytes);
    hasher.finalize_hex()
}

pub fn digest_file(algo: HashAlgo, path: &Path) -> Result<String> {
    let mut f = File::open(path)?;
    Ok(digest_reader(algo, &mut f)?)
}

/// Read a hash record file and return its normalised digest.
pub fn read_record(record: &Path) -> Result<String> {
    let text = std::fs::read_to_string(record).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            SplitchError::not_found(format!("hash record {}", record.display()))
        }
        _ => SplitchError::Io(e),
    })?;
    let bytes = hex::parse_hex_array::<DIGEST_LEN>(&text).map_err(|e| {
        SplitchError::invalid(format!("hash record {}: {e}", record.display()))
    })?;
    Ok(::hex::encode(bytes))
}

/// Re-read `path` in full and compare its digest with the one stored in `record`.
pub fn verify_file(algo: HashAlgo, path: &Path, record: &Path) -> Result<Verification> {
    let expected = read_record(record)?;
    let actual = digest_file(algo, path)?;
    Ok(Verification::compare(expected, actual))
}
