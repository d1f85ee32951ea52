//! Part and hash-record file names.
//!
//! A batch of parts for `ebook.pdf` split at 10:48 on 5 Nov 2022 looks like
//! `ebook_11052022_1048_1.prt`, `ebook_11052022_1048_2.prt`, ... plus the record
//! `ebook_hash_11052022_1048`. Reassembly order comes from the trailing index,
//! never from lexical order of the names.

use std::fmt;
use std::path::Path;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::{Result, SplitchError};

pub const PART_EXT: &str = "prt";
const HASH_TAG: &str = "hash";

const TOKEN_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month][day][year]_[hour][minute]");

/// Batch identifier: `MMDDYYYY_HHMM`. Minute granularity, so two batches of the
/// same base name started within one minute share a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchToken(String);

impl BatchToken {
    /// Token for the current local minute (UTC if the local offset is unknown).
    pub fn now() -> Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::at(now)
    }

    pub fn at(when: OffsetDateTime) -> Result<Self> {
        when.format(TOKEN_FORMAT)
            .map(BatchToken)
            .map_err(|e| SplitchError::Timestamp(e.to_string()))
    }

    /// Accepts exactly eight digits, an underscore, four digits.
    pub fn parse(s: &str) -> Option<Self> {
        let (date, clock) = s.split_once('_')?;
        if date.len() == 8 && clock.len() == 4 && all_digits(date) && all_digits(clock) {
            Some(BatchToken(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for BatchToken {
    type Err = SplitchError;

    fn from_str(s: &str) -> Result<Self> {
        BatchToken::parse(s)
            .ok_or_else(|| SplitchError::invalid(format!("malformed batch token: {s}")))
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn part_name(base: &str, token: &BatchToken, index: u64) -> String {
    format!("{base}_{token}_{index}.{PART_EXT}")
}

pub fn hash_record_name(base: &str, token: &BatchToken) -> String {
    format!("{base}_{HASH_TAG}_{token}")
}

/// A file name recognised as a part of `base`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartName {
    pub token: BatchToken,
    pub index: u64,
}

impl PartName {
    /// Parse `<base>_<token>_<index>.prt`; anything else is `None`.
    pub fn parse(base: &str, file_name: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(base)?.strip_prefix('_')?;
        let stem = rest.strip_suffix(PART_EXT)?.strip_suffix('.')?;
        let (token, index) = stem.rsplit_once('_')?;
        if !all_digits(index) {
            return None;
        }
        let index: u64 = index.parse().ok()?;
        if index == 0 {
            return None;
        }
        Some(PartName {
            token: BatchToken::parse(token)?,
            index,
        })
    }
}

/// Token embedded in a hash record named `<base>_hash_<token>`.
pub fn token_from_hash_record(base: &str, record: &Path) -> Option<BatchToken> {
    let name = record.file_name()?.to_str()?;
    let token = name
        .strip_prefix(base)?
        .strip_prefix('_')?
        .strip_prefix(HASH_TAG)?
        .strip_prefix('_')?;
    BatchToken::parse(token)
}

/// Order parts by numeric index. Stable, so equal indices keep discovery order.
pub fn sort_by_index<T>(items: &mut [T], index_of: impl Fn(&T) -> u64) {
    items.sort_by_key(index_of);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    fn token() -> BatchToken {
        BatchToken::parse("05112022_1048").unwrap()
    }

    #[test]
    fn token_formats_month_day_year_hour_minute() {
        let t = BatchToken::at(datetime!(2022-05-11 09:07 UTC)).unwrap();
        assert_eq!(t.as_str(), "05112022_0907");
        let t = BatchToken::at(datetime!(2023-12-31 23:59:59 UTC)).unwrap();
        assert_eq!(t.as_str(), "12312023_2359");
    }

    #[test]
    fn names_follow_layout() {
        assert_eq!(part_name("flask", &token(), 3), "flask_05112022_1048_3.prt");
        assert_eq!(hash_record_name("flask", &token()), "flask_hash_05112022_1048");
    }

    #[rstest]
    #[case::simple("flask", "flask_05112022_1048_3.prt", Some(3))]
    #[case::underscored_base("my_file", "my_file_05112022_1048_12.prt", Some(12))]
    #[case::other_base("flask", "flasks_05112022_1048_3.prt", None)]
    #[case::nested_base("a", "a_b_05112022_1048_1.prt", None)]
    #[case::wrong_ext("flask", "flask_05112022_1048_3.part", None)]
    #[case::zero_index("flask", "flask_05112022_1048_0.prt", None)]
    #[case::non_numeric("flask", "flask_05112022_1048_x.prt", None)]
    #[case::signed("flask", "flask_05112022_1048_+4.prt", None)]
    #[case::hash_record("flask", "flask_hash_05112022_1048", None)]
    fn parses_part_names(#[case] base: &str, #[case] name: &str, #[case] want: Option<u64>) {
        assert_eq!(PartName::parse(base, name).map(|p| p.index), want);
    }

    #[test]
    fn numeric_not_lexical_order() {
        let mut names = vec![
            "flask_05112022_1048_10.prt",
            "flask_05112022_1048_2.prt",
            "flask_05112022_1048_1.prt",
        ];
        sort_by_index(&mut names, |n| PartName::parse("flask", n).unwrap().index);
        assert_eq!(
            names,
            vec![
                "flask_05112022_1048_1.prt",
                "flask_05112022_1048_2.prt",
                "flask_05112022_1048_10.prt",
            ]
        );
    }

    #[test]
    fn token_recovered_from_record_name() {
        let rec = Path::new("dir/flask_hash_05112022_1048");
        assert_eq!(token_from_hash_record("flask", rec), Some(token()));
        assert_eq!(token_from_hash_record("other", rec), None);
        assert_eq!(token_from_hash_record("flask", Path::new("custom.sha")), None);
    }

    #[test]
    fn token_parse_rejects_bad_shapes() {
        assert!(BatchToken::parse("0511202_1048").is_none());
        assert!(BatchToken::parse("05112022-1048").is_none());
        assert!(BatchToken::parse("0511202a_1048").is_none());
        assert!("05112022_1048".parse::<BatchToken>().is_ok());
    }
}
