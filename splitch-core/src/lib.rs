#![forbid(unsafe_code)]

pub mod error;
pub mod domain;
pub mod naming;
pub mod plan;

pub mod hash;

pub mod util {
    pub mod drop_guard;
}

pub mod split {
    pub mod writer;
}

pub mod stitch {
    pub mod discover;
    pub mod reader;
}

pub mod resume;

// Re-exports: stable API surface
pub use domain::{HashRecord, Part, SourceFile, SplitBatch};
pub use hash::{HashAlgo, Verification};
pub use naming::BatchToken;
pub use plan::{SegmentPlan, SplitMode};
pub use resume::Descriptor;
pub use split::writer::{SplitOptions, split};
pub use stitch::reader::{StitchOptions, StitchReport, stitch};
