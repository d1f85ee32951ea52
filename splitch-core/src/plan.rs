use crate::error::{Result, SplitchError};

/// How a source file is cut up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// Exactly this many parts; the last one absorbs the remainder.
    Parts(u64),
    /// Parts of this many bytes; the last one may be shorter.
    ChunkSize(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub index: u64,
    pub offset: u64,
    pub len: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentPlan {
    pub total: u64,
    pub nominal: u64,
    pub mode: SplitMode,
}

impl SegmentPlan {
    pub fn new(total: u64, mode: SplitMode) -> Result<Self> {
        let nominal = match mode {
            SplitMode::Parts(0) => {
                return Err(SplitchError::invalid("part count must be positive"));
            }
            SplitMode::ChunkSize(0) => {
                return Err(SplitchError::invalid("chunk size must be positive"));
            }
            SplitMode::Parts(k) => total / k,
            SplitMode::ChunkSize(c) if c > total => {
                return Err(SplitchError::invalid(format!(
                    "chunk size {c} is greater than file size {total}"
                )));
            }
            SplitMode::ChunkSize(c) => c,
        };
        if nominal < 1 {
            return Err(SplitchError::invalid("at least 1 byte required per part"));
        }
        Ok(Self {
            total,
            nominal,
            mode,
        })
    }

    pub fn part_count(&self) -> u64 {
        match self.mode {
            SplitMode::Parts(k) => k,
            SplitMode::ChunkSize(c) => self.total.div_ceil(c),
        }
    }

    pub fn segments(&self) -> Segments {
        Segments {
            plan: *self,
            next: 1,
            offset: 0,
        }
    }
}

pub struct Segments {
    plan: SegmentPlan,
    next: u64,
    offset: u64,
}

impl Iterator for Segments {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let count = self.plan.part_count();
        if self.next > count {
            return None;
        }
        let remaining = self.plan.total - self.offset;
        let len = if self.next == count {
            remaining
        } else {
            self.plan.nominal.min(remaining)
        };
        let seg = Segment {
            index: self.next,
            offset: self.offset,
            len,
        };
        self.next += 1;
        self.offset += len;
        Some(seg)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.plan.part_count() + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Segments {}
