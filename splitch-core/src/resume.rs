//! Auto-resume descriptor.
//!
//! A split leaves `stitch.json` in the invocation directory. When the CLI finds
//! it on start-up it stitches the recorded file and exits, ignoring any other
//! arguments. The file is not removed after a successful stitch.

use crate::error::{Result, SplitchError};
use crate::hash::HashAlgo;
use crate::stitch::reader::{StitchOptions, StitchReport, stitch};
use crate::util::drop_guard::PendingFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_FILE: &str = "stitch.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StitchEntry {
    pub filename: PathBuf,
    pub hashfile: PathBuf,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub verbose: bool,
    #[serde(default)]
    pub algorithm: HashAlgo,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub stitch: StitchEntry,
    pub settings: Settings,
}

impl Descriptor {
    pub fn new(filename: PathBuf, hashfile: PathBuf, verbose: bool, algorithm: HashAlgo) -> Self {
        Self {
            stitch: StitchEntry { filename, hashfile },
            settings: Settings { verbose, algorithm },
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(DESCRIPTOR_FILE)
    }

    /// Read the descriptor in `dir`, if there is one. Relative paths inside it
    /// are taken relative to `dir`.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(dir);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut d: Descriptor = serde_json::from_slice(&bytes)
            .map_err(|e| SplitchError::Descriptor(format!("{}: {e}", path.display())))?;
        d.stitch.filename = dir.join(&d.stitch.filename);
        d.stitch.hashfile = dir.join(&d.stitch.hashfile);
        Ok(Some(d))
    }

    /// Write to `dir`, replacing any previous descriptor. A failed write
    /// leaves no file behind.
    pub fn store(&self, dir: &Path) -> Result<PathBuf> {
        write_guarded(&Self::path_in(dir), |w| {
            serde_json::to_writer_pretty(&mut *w, self)
                .map_err(|e| SplitchError::Descriptor(e.to_string()))?;
            w.write_all(b"\n")?;
            Ok(())
        })
    }

    pub fn stitch_options(&self) -> StitchOptions {
        StitchOptions {
            hash_record: Some(self.stitch.hashfile.clone()),
            algo: self.settings.algorithm,
            ..StitchOptions::default()
        }
    }

    /// Stitch the recorded file in place, verifying against the recorded hash.
    pub fn resume(&self) -> Result<StitchReport> {
        tracing::info!(file = %self.stitch.filename.display(), "auto-stitch");
        stitch(&self.stitch.filename, &self.stitch_options())
    }
}

fn write_guarded(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> Result<()>,
) -> Result<PathBuf> {
    let guard = PendingFile::new(path);
    let mut w = BufWriter::new(File::create(guard.path())?);
    body(&mut w)?;
    w.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(guard.commit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Descriptor {
        Descriptor::new(
            PathBuf::from("/data/ebook.pdf"),
            PathBuf::from("/data/ebook_hash_05112022_1048"),
            true,
            HashAlgo::Sha256,
        )
    }

    #[test]
    fn absent_descriptor_loads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Descriptor::load(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn store_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let written = sample().store(tmp.path()).unwrap();
        assert_eq!(written, tmp.path().join(DESCRIPTOR_FILE));
        assert_eq!(Descriptor::load(tmp.path()).unwrap(), Some(sample()));
    }

    #[test]
    fn sections_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        sample().store(tmp.path()).unwrap();
        let v: serde_json::Value =
            serde_json::from_slice(&std::fs::read(Descriptor::path_in(tmp.path())).unwrap())
                .unwrap();
        assert_eq!(v["stitch"]["filename"], "/data/ebook.pdf");
        assert_eq!(v["settings"]["verbose"], true);
        assert_eq!(v["settings"]["algorithm"], "sha256");
    }

    #[test]
    fn relative_paths_resolve_against_descriptor_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            Descriptor::path_in(tmp.path()),
            r#"{"stitch":{"filename":"a.bin","hashfile":"a_hash_05112022_1048"},"settings":{"verbose":false}}"#,
        )
        .unwrap();
        let d = Descriptor::load(tmp.path()).unwrap().unwrap();
        assert_eq!(d.stitch.filename, tmp.path().join("a.bin"));
        assert_eq!(d.settings.algorithm, HashAlgo::Sha256);
    }

    #[test]
    fn malformed_descriptor_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(Descriptor::path_in(tmp.path()), "[stitch]\nfilename=x\n").unwrap();
        let err = Descriptor::load(tmp.path()).unwrap_err();
        assert!(matches!(err, SplitchError::Descriptor(_)));
    }

    #[test]
    fn failed_write_removes_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Descriptor::path_in(tmp.path());
        let err = write_guarded(&path, |w| {
            w.write_all(b"{\"stitch\":")?;
            w.flush()?;
            Err(SplitchError::Descriptor("interrupted".into()))
        })
        .unwrap_err();
        assert!(matches!(err, SplitchError::Descriptor(_)));
        assert!(!path.exists());
    }
}
