use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::constants::MAX_DEPTH;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    MapKey(SmolStr),
    ArrayMarker,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::MapKey(name) => write!(f, "[{name}]"),
            Segment::ArrayMarker => f.write_str("[]"),
        }
    }
}

pub type KeyPath = SmallVec<[Segment; 4]>;

/// Split a decoded key into path segments.
///
/// `foo` -> `[MapKey(foo)]`, `foo[bar]` -> `[MapKey(foo), MapKey(bar)]`,
/// `foo[]` -> `[MapKey(foo), ArrayMarker]`.
pub fn parse_key(raw: &str) -> Result<KeyPath> {
    let head_end = raw.find(['[', ']']).unwrap_or(raw.len());
    let head = &raw[..head_end];
    if head.is_empty() {
        return Err(Error::malformed_key(raw, "key must start with a name"));
    }

    let mut path = KeyPath::new();
    path.push(Segment::MapKey(SmolStr::new(head)));

    let mut rest = &raw[head_end..];
    while !rest.is_empty() {
        let Some(inner_start) = rest.strip_prefix('[') else {
            let reason = if rest.starts_with(']') {
                "unmatched closing bracket"
            } else {
                "unexpected text after closing bracket"
            };
            return Err(Error::malformed_key(raw, reason));
        };

        let close = inner_start
            .find(['[', ']'])
            .ok_or_else(|| Error::malformed_key(raw, "unmatched opening bracket"))?;
        if inner_start.as_bytes()[close] == b'[' {
            return Err(Error::malformed_key(raw, "nested opening bracket"));
        }

        let inner = &inner_start[..close];
        path.push(if inner.is_empty() {
            Segment::ArrayMarker
        } else {
            Segment::MapKey(SmolStr::new(inner))
        });
        if path.len() > MAX_DEPTH {
            return Err(Error::malformed_key(raw, "key nests too deeply"));
        }

        rest = &inner_start[close + 1..];
    }

    Ok(path)
}
