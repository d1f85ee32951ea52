use clap::{Args, Parser, Subcommand};
use splitch_core::{BatchToken, HashAlgo};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  splitch split ebook.pdf --size 100000
  splitch split ebook.pdf --parts 10
  splitch stitch ebook.pdf
  splitch stitch ebook.pdf -o ebook_stitched.pdf --hashfile ebook_hash_05112022_1048

If stitch.json exists in the current directory, splitch stitches the file it
names and exits, ignoring all other arguments.";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Split a file into parts and stitch them back together",
    long_about = None,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Narrate each step
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SplitSize {
    /// number of parts to split into
    #[arg(short, long)]
    pub parts: Option<u64>,
    /// size of each chunk in bytes
    #[arg(short, long)]
    pub size: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a file into `.prt` parts next to it, plus a hash record
    Split {
        file: PathBuf,

        #[command(flatten)]
        size: SplitSize,

        /// digest written to the hash record
        #[arg(long, default_value_t = HashAlgo::Sha256)]
        algorithm: HashAlgo,

        /// do not write the stitch.json auto-stitch descriptor
        #[arg(long)]
        no_resume: bool,
    },

    /// Stitch the parts of a file back together
    Stitch {
        file: PathBuf,

        /// write here instead of overwriting FILE; a bare name lands next to FILE
        #[arg(short, long)]
        outfile: Option<PathBuf>,

        /// hash record of the original file, checked after stitching
        #[arg(long)]
        hashfile: Option<PathBuf>,

        /// only use parts of this batch (MMDDYYYY_HHMM)
        #[arg(long)]
        batch: Option<BatchToken>,

        #[arg(long, default_value_t = HashAlgo::Sha256)]
        algorithm: HashAlgo,

        /// exit with an error when the hash does not match
        #[arg(long)]
        strict: bool,
    },
}
