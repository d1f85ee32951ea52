// splitch_core/src/domain.rs
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitchError};
use crate::hash::HashAlgo;
use crate::naming::BatchToken;

/// The file being split: its location, size and extension-stripped name.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size: u64,
    pub dir: PathBuf,
    pub base_name: String,
}

impl SourceFile {
    /// Stat `path` and derive its directory and base name.
    pub fn open(path: &Path) -> Result<Self> {
        let md = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                SplitchError::not_found(format!("source file {}", path.display()))
            }
            _ => SplitchError::Io(e),
        })?;
        if !md.is_file() {
            return Err(SplitchError::invalid(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let (dir, base_name) = split_location(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            size: md.len(),
            dir,
            base_name,
        })
    }
}

/// Directory (possibly empty, meaning the working directory) and base name of `path`.
pub(crate) fn split_location(path: &Path) -> Result<(PathBuf, String)> {
    let base_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| SplitchError::invalid(format!("no file name in {}", path.display())))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((dir, base_name))
}

/// A directory suitable for listing; the empty path stands for `.`.
pub(crate) fn listable(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub token: BatchToken,
    /// 1-based, contiguous within a batch.
    pub index: u64,
    pub len: u64,
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashRecord {
    pub path: PathBuf,
    pub algo: HashAlgo,
    pub digest: String,
}

/// Everything one split invocation produced.
#[derive(Clone, Debug)]
pub struct SplitBatch {
    pub source: SourceFile,
    pub token: BatchToken,
    pub parts: Vec<Part>,
    pub hash_record: HashRecord,
    /// Where the auto-resume descriptor landed, if it was written.
    pub descriptor: Option<PathBuf>,
}

impl SplitBatch {
    pub fn total_len(&self) -> u64 {
        self.parts.iter().map(|p| p.len).sum()
    }
}
