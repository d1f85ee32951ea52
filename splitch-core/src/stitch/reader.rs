use super::discover::{Scope, discover};
use crate::domain::{Part, split_location};
use crate::error::{Result, SplitchError};
use crate::hash::{self, HashAlgo, Verification};
use crate::naming::{self, BatchToken};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default)]
pub struct StitchOptions {
    /// Output file; defaults to overwriting the source. A bare name lands
    /// next to the source, not in the working directory.
    pub out: Option<PathBuf>,
    /// Hash record to verify against. A bare name is looked up next to the source.
    pub hash_record: Option<PathBuf>,
    /// Only stitch this batch. When unset the token is taken from the hash
    /// record's name if it has the standard form, else every batch is considered.
    pub batch: Option<BatchToken>,
    pub algo: HashAlgo,
}

#[derive(Clone, Debug)]
pub struct StitchReport {
    pub output: PathBuf,
    pub parts: Vec<Part>,
    pub bytes_written: u64,
    /// `None` when no hash record was given.
    pub verification: Option<Verification>,
}

impl StitchReport {
    /// Treat a digest mismatch as an error.
    pub fn ensure_verified(self) -> Result<Self> {
        match &self.verification {
            Some(Verification::Mismatch { expected, actual }) => {
                Err(SplitchError::IntegrityMismatch {
                    expected: expected.clone(),
                    actual: actual.clone(),
                })
            }
            _ => Ok(self),
        }
    }
}

/// `p` itself, or `dir/p` when `p` is a bare file name.
fn beside(dir: &Path, p: &Path) -> PathBuf {
    match p.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => p.to_path_buf(),
        _ => dir.join(p),
    }
}

/// Reassemble the parts of `source` in index order.
///
/// A digest mismatch is reported in the returned [`StitchReport`], not as an error.
pub fn stitch(source: &Path, opts: &StitchOptions) -> Result<StitchReport> {
    if source.as_os_str().is_empty() {
        return Err(SplitchError::invalid("no source file given"));
    }
    let (dir, base) = split_location(source)?;

    let record = opts.hash_record.as_deref().map(|r| beside(&dir, r));
    // fail before the output is truncated
    let expected = record.as_deref().map(hash::read_record).transpose()?;

    let scope = match (&opts.batch, &record) {
        (Some(t), _) => Scope::Batch(t.clone()),
        (None, Some(r)) => naming::token_from_hash_record(&base, r)
            .map(Scope::Batch)
            .unwrap_or(Scope::AnyBatch),
        (None, None) => Scope::AnyBatch,
    };
    debug!(?scope, "discovering parts");

    let parts = discover(&dir, &base, &scope)?;
    if parts.is_empty() {
        return Err(SplitchError::not_found(format!(
            "no parts found for {}",
            source.display()
        )));
    }

    let output = match &opts.out {
        Some(o) => beside(&dir, o),
        None => source.to_path_buf(),
    };
    debug!(output = %output.display(), parts = parts.len(), "stitching");

    let mut out = BufWriter::new(File::create(&output)?);
    let mut bytes_written = 0u64;
    for part in &parts {
        debug!(part = %part.path.display(), "reading part");
        let mut f = File::open(&part.path)?;
        bytes_written += std::io::copy(&mut f, &mut out)?;
    }
    out.flush()?;
    drop(out);
    debug!(bytes = bytes_written, "written");

    let verification = match expected {
        Some(expected) => {
            info!("verifying hash");
            let actual = hash::digest_file(opts.algo, &output)?;
            let v = Verification::compare(expected, actual);
            if v.is_verified() {
                info!("hash verified");
            } else {
                warn!("hash verification failed");
            }
            Some(v)
        }
        None => None,
    };

    info!(output = %output.display(), bytes = bytes_written, "stitch complete");
    Ok(StitchReport {
        output,
        parts,
        bytes_written,
        verification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn bare_names_resolve_beside_source() {
        let dir = Path::new("in");
        assert_eq!(beside(dir, Path::new("out.bin")), PathBuf::from("in/out.bin"));
        assert_eq!(beside(dir, Path::new("x/out.bin")), PathBuf::from("x/out.bin"));
        assert_eq!(beside(Path::new(""), Path::new("o")), PathBuf::from("o"));
    }

    #[test]
    fn empty_source_is_rejected() {
        let err = stitch(Path::new(""), &StitchOptions::default()).unwrap_err();
        assert!(matches!(err, SplitchError::InvalidArgument(_)));
    }

    #[test]
    fn no_parts_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("movie.mkv");
        let err = stitch(&src, &StitchOptions::default()).unwrap_err();
        assert!(matches!(err, SplitchError::NotFound(_)));
        assert!(!src.exists());
    }

    #[test]
    fn concatenates_in_index_order() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path();
        for (i, chunk) in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]
            .iter()
            .enumerate()
        {
            fs::write(d.join(format!("x_01012024_0000_{}.prt", i + 1)), chunk).unwrap();
        }
        let report = stitch(
            &d.join("x.txt"),
            &StitchOptions {
                out: Some(PathBuf::from("joined.txt")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(report.output, d.join("joined.txt"));
        assert_eq!(report.bytes_written, 11);
        assert_eq!(fs::read_to_string(d.join("joined.txt")).unwrap(), "abcdefghijk");
        assert!(report.verification.is_none());
    }

    #[test]
    fn missing_record_fails_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path();
        fs::write(d.join("x_01012024_0000_1.prt"), "a").unwrap();
        fs::write(d.join("x.txt"), "original").unwrap();
        let err = stitch(
            &d.join("x.txt"),
            &StitchOptions {
                hash_record: Some(PathBuf::from("x_hash_01012024_0000")),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, SplitchError::NotFound(_)));
        assert_eq!(fs::read_to_string(d.join("x.txt")).unwrap(), "original");
    }

    #[test]
    fn mismatch_is_reported_and_can_be_made_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path();
        fs::write(d.join("x_01012024_0000_1.prt"), "abc").unwrap();
        fs::write(
            d.join("x_hash_01012024_0000"),
            hash::digest_bytes(HashAlgo::Sha256, b"abcd"),
        )
        .unwrap();
        let report = stitch(
            &d.join("x.txt"),
            &StitchOptions {
                hash_record: Some(PathBuf::from("x_hash_01012024_0000")),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matches!(
            report.verification,
            Some(Verification::Mismatch { .. })
        ));
        let err = report.ensure_verified().unwrap_err();
        assert!(matches!(err, SplitchError::IntegrityMismatch { .. }));
    }
}
