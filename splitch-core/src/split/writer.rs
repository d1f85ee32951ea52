use crate::domain::{HashRecord, Part, SourceFile, SplitBatch};
use crate::error::Result;
use crate::hash::{self, HashAlgo};
use crate::naming::{self, BatchToken};
use crate::plan::{SegmentPlan, SplitMode};
use crate::resume::Descriptor;
use crate::stitch::discover::{self, Scope};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub mode: SplitMode,
    pub algo: HashAlgo,
    /// Stored in the auto-resume descriptor so the resumed stitch narrates the same way.
    pub verbose: bool,
    /// Where to write the auto-resume descriptor; `None` skips it.
    pub descriptor_dir: Option<PathBuf>,
    /// Pin the batch token instead of taking the current minute.
    pub token: Option<BatchToken>,
}

impl SplitOptions {
    pub fn new(mode: SplitMode) -> Self {
        Self {
            mode,
            algo: HashAlgo::default(),
            verbose: false,
            descriptor_dir: None,
            token: None,
        }
    }
}

/// Copy exactly `len` bytes from `src` to `dst`.
fn copy_exact<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    len: u64,
    buf: &mut [u8],
) -> Result<()> {
    let mut left = len;
    while left > 0 {
        let n = usize::try_from(left).map_or(buf.len(), |l| buf.len().min(l));
        let k = src.read(&mut buf[..n])?;
        if k == 0 {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("source ended {left} bytes early"),
            )
            .into());
        }
        dst.write_all(&buf[..k])?;
        left -= k as u64;
    }
    Ok(())
}

/// Cut `source` into parts next to it and record its digest.
///
/// The digest is taken before any part is written. Size arguments are
/// validated before anything touches the disk.
pub fn split(source: &Path, opts: &SplitOptions) -> Result<SplitBatch> {
    let src = SourceFile::open(source)?;
    debug!(source = %src.path.display(), size = src.size, "source file");

    let plan = SegmentPlan::new(src.size, opts.mode)?;
    debug!(
        nominal = plan.nominal,
        parts = plan.part_count(),
        "segment plan"
    );

    let token = match &opts.token {
        Some(t) => t.clone(),
        None => BatchToken::now()?,
    };

    debug!(algo = %opts.algo, "generating hash");
    let digest = hash::digest_file(opts.algo, &src.path)?;
    debug!(%digest, "hash");

    let record_path = src
        .dir
        .join(naming::hash_record_name(&src.base_name, &token));
    if record_path.exists() {
        warn!(
            record = %record_path.display(),
            %token,
            "a batch with this token already exists; replacing its parts"
        );
    }

    let mut f = File::open(&src.path)?;
    let mut parts = Vec::new();
    let mut io_buf = vec![0u8; 1 << 16];

    for seg in plan.segments() {
        let path = src
            .dir
            .join(naming::part_name(&src.base_name, &token, seg.index));
        let mut out = File::create(&path)?;
        copy_exact(&mut f, &mut out, seg.len, &mut io_buf)?;
        debug!(part = %path.display(), len = seg.len, "wrote part");
        parts.push(Part {
            token: token.clone(),
            index: seg.index,
            len: seg.len,
            path,
        });
    }

    remove_stale_parts(&src, &token, plan.part_count())?;
    fs::write(&record_path, &digest)?;
    debug!(record = %record_path.display(), "hash record");

    let descriptor = opts
        .descriptor_dir
        .as_deref()
        .and_then(|dir| write_descriptor(dir, &src, &record_path, opts));

    info!(
        source = %src.path.display(),
        parts = parts.len(),
        %token,
        "split complete"
    );

    Ok(SplitBatch {
        source: src,
        token,
        parts,
        hash_record: HashRecord {
            path: record_path,
            algo: opts.algo,
            digest,
        },
        descriptor,
    })
}

/// Drop parts of an earlier batch with the same token that lie past `count`,
/// so a scoped stitch sees only this batch.
fn remove_stale_parts(src: &SourceFile, token: &BatchToken, count: u64) -> Result<()> {
    let scope = Scope::Batch(token.clone());
    for stale in discover::discover(&src.dir, &src.base_name, &scope)?
        .into_iter()
        .filter(|p| p.index > count)
    {
        fs::remove_file(&stale.path)?;
        debug!(part = %stale.path.display(), "removed stale part");
    }
    Ok(())
}

/// Best effort: a failure here is logged and never fails the split.
fn write_descriptor(
    dir: &Path,
    src: &SourceFile,
    record: &Path,
    opts: &SplitOptions,
) -> Option<PathBuf> {
    debug!("generating auto-stitch descriptor");
    match store_descriptor(dir, src, record, opts) {
        Ok(p) => {
            debug!(descriptor = %p.display(), "saved auto-stitch descriptor");
            Some(p)
        }
        Err(e) => {
            warn!(error = %e, "could not create auto-stitch descriptor; stitch manually");
            None
        }
    }
}

fn store_descriptor(
    dir: &Path,
    src: &SourceFile,
    record: &Path,
    opts: &SplitOptions,
) -> Result<PathBuf> {
    let filename = std::path::absolute(&src.path)?;
    let hashfile = std::path::absolute(record)?;
    Descriptor::new(filename, hashfile, opts.verbose, opts.algo).store(dir)
}
