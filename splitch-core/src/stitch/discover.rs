use crate::domain::{Part, listable};
use crate::error::Result;
use crate::naming::{self, BatchToken, PartName};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Which batches discovery may return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Batch(BatchToken),
    /// Every batch sharing the base name, like a `<base>_*.prt` glob.
    AnyBatch,
}

impl Scope {
    fn admits(&self, token: &BatchToken) -> bool {
        match self {
            Scope::Batch(t) => t == token,
            Scope::AnyBatch => true,
        }
    }
}

/// Find the parts of `base` in `dir`, ordered by part index.
pub fn discover(dir: &Path, base: &str, scope: &Scope) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    for entry in fs::read_dir(listable(dir))? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(PartName { token, index }) = PartName::parse(base, name) else {
            continue;
        };
        if !scope.admits(&token) {
            debug!(part = name, "skipping part of another batch");
            continue;
        }
        let md = fs::metadata(entry.path())?;
        if !md.is_file() {
            continue;
        }
        parts.push(Part {
            token,
            index,
            len: md.len(),
            path: dir.join(name),
        });
    }

    // read_dir order is unspecified; fix it before the stable index sort
    parts.sort_by(|a, b| a.path.cmp(&b.path));
    naming::sort_by_index(&mut parts, |p| p.index);
    check_sequence(&parts);
    Ok(parts)
}

fn check_sequence(parts: &[Part]) {
    let tokens: BTreeSet<_> = parts.iter().map(|p| &p.token).collect();
    if tokens.len() > 1 {
        let list: Vec<_> = tokens.iter().map(|t| t.as_str()).collect();
        warn!(
            batches = ?list,
            "parts from several batches found; pass a batch or hash record to pick one"
        );
    }
    for (want, part) in (1u64..).zip(parts) {
        if part.index != want {
            warn!(
                expected = want,
                found = part.index,
                "part sequence has a gap or duplicate"
            );
            break;
        }
    }
}
