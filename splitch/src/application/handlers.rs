use std::path::PathBuf;

use splitch_core::error::{Result, SplitchError};
use splitch_core::resume::DESCRIPTOR_FILE;
use splitch_core::{
    BatchToken, Descriptor, HashAlgo, SplitMode, SplitOptions, StitchOptions, StitchReport,
    Verification, split, stitch,
};

fn split_mode(parts: Option<u64>, size: Option<u64>) -> Result<SplitMode> {
    match (parts, size) {
        (Some(p), None) => Ok(SplitMode::Parts(p)),
        (None, Some(s)) => Ok(SplitMode::ChunkSize(s)),
        (None, None) => Err(SplitchError::InvalidArgument(
            "split requires --parts or --size".into(),
        )),
        (Some(_), Some(_)) => Err(SplitchError::InvalidArgument(
            "--parts and --size are mutually exclusive".into(),
        )),
    }
}

pub fn handle_split(
    file: PathBuf,
    parts: Option<u64>,
    size: Option<u64>,
    algorithm: HashAlgo,
    verbose: bool,
    descriptor_dir: Option<PathBuf>,
) -> Result<()> {
    let opts = SplitOptions {
        algo: algorithm,
        verbose,
        descriptor_dir,
        ..SplitOptions::new(split_mode(parts, size)?)
    };
    let batch = split(&file, &opts)?;
    for p in &batch.parts {
        println!("{}  {} bytes", p.path.display(), p.len);
    }
    println!(
        "split: {} -> {} parts, hash record {}",
        file.display(),
        batch.parts.len(),
        batch.hash_record.path.display()
    );
    if let Some(d) = &batch.descriptor {
        println!("saved {}; the next run will stitch automatically", d.display());
    }
    Ok(())
}

pub fn handle_stitch(
    file: PathBuf,
    outfile: Option<PathBuf>,
    hashfile: Option<PathBuf>,
    batch: Option<BatchToken>,
    algorithm: HashAlgo,
    strict: bool,
) -> Result<()> {
    let opts = StitchOptions {
        out: outfile,
        hash_record: hashfile,
        batch,
        algo: algorithm,
    };
    let report = stitch(&file, &opts)?;
    print_report(&report);
    if strict {
        report.ensure_verified()?;
    }
    Ok(())
}

pub fn handle_resume(descriptor: Descriptor) -> Result<()> {
    println!("found {DESCRIPTOR_FILE}");
    tracing::debug!(?descriptor, "auto-stitch descriptor");
    let report = descriptor.resume()?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &StitchReport) {
    println!(
        "stitch: {} parts -> {} ({} bytes)",
        report.parts.len(),
        report.output.display(),
        report.bytes_written
    );
    match &report.verification {
        Some(Verification::Verified { .. }) => println!("hash verified"),
        Some(Verification::Mismatch { expected, actual }) => {
            println!("hash verification failed (expected {expected}, got {actual})")
        }
        None => {}
    }
}
