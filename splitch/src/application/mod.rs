pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use splitch_core::Descriptor;
use splitch_core::error::Result;
use std::ffi::OsString;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "splitch=debug,splitch_core=debug"
    } else {
        "splitch=info,splitch_core=info"
    }
}

/// `RUST_LOG` wins; otherwise `verbose` picks debug over info.
/// Only the first call installs a subscriber.
fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(verbose).into()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir()?;
    run_from(&cwd, std::env::args_os())
}

pub fn run_from<I, T>(cwd: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    // a pending auto-stitch takes precedence over whatever was asked for
    if let Some(descriptor) = Descriptor::load(cwd)? {
        init_logging(descriptor.settings.verbose);
        return handlers::handle_resume(descriptor);
    }

    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);
    match cli.command {
        Commands::Split {
            file,
            size,
            algorithm,
            no_resume,
        } => handlers::handle_split(
            file,
            size.parts,
            size.size,
            algorithm,
            cli.verbose,
            (!no_resume).then(|| cwd.to_path_buf()),
        ),
        Commands::Stitch {
            file,
            outfile,
            hashfile,
            batch,
            algorithm,
            strict,
        } => handlers::handle_stitch(file, outfile, hashfile, batch, algorithm, strict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitch_core::{SplitMode, SplitOptions, split};
    use std::fs;

    fn part_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|x| x == "prt")
            })
            .count()
    }

    #[test]
    fn verbose_selects_debug_filter() {
        assert_eq!(log_filter(true), "splitch=debug,splitch_core=debug");
        assert_eq!(log_filter(false), "splitch=info,splitch_core=info");
    }

    #[test]
    fn descriptor_overrides_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("x");
        fs::write(&src, b"resume me before anything else").unwrap();

        let opts = SplitOptions {
            descriptor_dir: Some(tmp.path().to_path_buf()),
            ..SplitOptions::new(SplitMode::Parts(3))
        };
        let batch = split(&src, &opts).unwrap();
        assert!(batch.descriptor.is_some());
        fs::remove_file(&src).unwrap();

        run_from(tmp.path(), ["splitch", "split", "x", "-p", "2"]).unwrap();

        assert_eq!(fs::read(&src).unwrap(), b"resume me before anything else");
        assert_eq!(part_count(tmp.path()), 3);
    }

    #[test]
    fn without_descriptor_arguments_are_used() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("x");
        fs::write(&src, b"0123456789").unwrap();
        let src_arg = src.to_str().unwrap();

        run_from(
            tmp.path(),
            ["splitch", "split", src_arg, "-p", "2", "--no-resume"],
        )
        .unwrap();

        assert_eq!(part_count(tmp.path()), 2);
        assert!(Descriptor::load(tmp.path()).unwrap().is_none());
    }
}
