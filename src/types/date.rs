use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::TIMESTAMP_TOKEN;
use crate::{Error, Node, Result};

pub type DateEncoder = Arc<dyn Fn(&DateTime<Utc>) -> Result<Node> + Send + Sync>;
pub type DateDecoder = Arc<dyn Fn(&Node) -> Result<DateTime<Utc>> + Send + Sync>;

/// A point in time that follows the configured [`DateStrategy`].
///
/// Other serde formats see the wrapped `DateTime<Utc>` unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(TIMESTAMP_TOKEN, &self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(TIMESTAMP_TOKEN, TimestampVisitor)
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an RFC 3339 timestamp")
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        DateTime::<Utc>::deserialize(deserializer).map(Timestamp)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

/// How [`Timestamp`] values are written to and read from leaves.
#[derive(Clone, Default)]
pub enum DateStrategy {
    /// The timestamp decomposes itself: chrono's RFC 3339 string.
    #[default]
    Deferred,
    SecondsSince1970,
    MillisecondsSince1970,
    /// RFC 3339 with whole seconds, e.g. `2024-03-01T12:00:00Z`.
    Iso8601,
    /// A chrono `strftime` pattern.
    Formatted(String),
    Custom {
        encode: DateEncoder,
        decode: DateDecoder,
    },
}

impl DateStrategy {
    pub fn formatted(pattern: impl Into<String>) -> Self {
        DateStrategy::Formatted(pattern.into())
    }

    pub fn custom<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&DateTime<Utc>) -> Result<Node> + Send + Sync + 'static,
        D: Fn(&Node) -> Result<DateTime<Utc>> + Send + Sync + 'static,
    {
        DateStrategy::Custom {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DateStrategy::Deferred)
    }

    pub(crate) fn encode(&self, value: &DateTime<Utc>) -> Result<Node> {
        match self {
            DateStrategy::Deferred => Ok(Node::leaf(
                value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )),
            DateStrategy::SecondsSince1970 => {
                Ok(Node::leaf(format_epoch(value, EpochUnit::Seconds)))
            }
            DateStrategy::MillisecondsSince1970 => {
                Ok(Node::leaf(format_epoch(value, EpochUnit::Milliseconds)))
            }
            DateStrategy::Iso8601 => Ok(Node::leaf(
                value.to_rfc3339_opts(SecondsFormat::Secs, true),
            )),
            DateStrategy::Formatted(pattern) => {
                let mut out = String::new();
                write!(out, "{}", value.format(pattern)).map_err(|_| {
                    Error::Message(format!("invalid date format pattern `{pattern}`"))
                })?;
                Ok(Node::Leaf(Some(out)))
            }
            DateStrategy::Custom { encode, .. } => encode(value),
        }
    }

    pub(crate) fn decode(&self, node: &Node) -> Result<DateTime<Utc>> {
        match self {
            DateStrategy::Custom { decode, .. } => decode(node),
            DateStrategy::Deferred | DateStrategy::Iso8601 => {
                let text = leaf_text(node)?;
                DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| Error::type_mismatch("RFC 3339 date", text))
            }
            DateStrategy::SecondsSince1970 => {
                parse_epoch(leaf_text(node)?, EpochUnit::Seconds)
            }
            DateStrategy::MillisecondsSince1970 => {
                parse_epoch(leaf_text(node)?, EpochUnit::Milliseconds)
            }
            DateStrategy::Formatted(pattern) => parse_formatted(leaf_text(node)?, pattern),
        }
    }
}

impl fmt::Debug for DateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateStrategy::Deferred => f.write_str("Deferred"),
            DateStrategy::SecondsSince1970 => f.write_str("SecondsSince1970"),
            DateStrategy::MillisecondsSince1970 => f.write_str("MillisecondsSince1970"),
            DateStrategy::Iso8601 => f.write_str("Iso8601"),
            DateStrategy::Formatted(pattern) => f.debug_tuple("Formatted").field(pattern).finish(),
            DateStrategy::Custom { .. } => f.write_str("Custom"),
        }
    }
}

fn leaf_text(node: &Node) -> Result<&str> {
    node.as_str()
        .ok_or_else(|| Error::type_mismatch("date", node.type_name()))
}

const NANOS_PER_SECOND: i128 = 1_000_000_000;

#[derive(Clone, Copy)]
enum EpochUnit {
    Seconds,
    Milliseconds,
}

impl EpochUnit {
    fn nanos(self) -> i128 {
        match self {
            EpochUnit::Seconds => NANOS_PER_SECOND,
            EpochUnit::Milliseconds => 1_000_000,
        }
    }

    /// Fraction digits down to whole nanoseconds.
    fn fraction_digits(self) -> usize {
        match self {
            EpochUnit::Seconds => 9,
            EpochUnit::Milliseconds => 6,
        }
    }
}

/// Plain decimal of the instant in `unit`, exact to the nanosecond.
fn format_epoch(value: &DateTime<Utc>, unit: EpochUnit) -> String {
    let total = i128::from(value.timestamp()) * NANOS_PER_SECOND
        + i128::from(value.timestamp_subsec_nanos());
    let magnitude = total.unsigned_abs();
    let unit_nanos = unit.nanos().unsigned_abs();

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }
    out.push_str(itoa::Buffer::new().format(magnitude / unit_nanos));
    let fraction = magnitude % unit_nanos;
    if fraction != 0 {
        let digits = format!("{fraction:0width$}", width = unit.fraction_digits());
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Reads `[-]digits[.digits]` without going through a float. Fraction digits
/// past nanosecond precision are truncated.
fn parse_epoch(text: &str, unit: EpochUnit) -> Result<DateTime<Utc>> {
    let invalid = || Error::type_mismatch("decimal epoch time", text);

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }

    let whole: i128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction_nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(unit.fraction_digits())
        .fold(0i128, |acc, b| acc * 10 + i128::from(b - b'0'));

    let magnitude = whole
        .checked_mul(unit.nanos())
        .and_then(|nanos| nanos.checked_add(fraction_nanos))
        .ok_or_else(invalid)?;
    let total = if negative { -magnitude } else { magnitude };

    let seconds = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).map_err(|_| invalid())?;
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SECOND)).map_err(|_| invalid())?;
    DateTime::from_timestamp(seconds, nanos).ok_or_else(|| Error::type_mismatch("date", text))
}

fn parse_formatted(text: &str, pattern: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(text, pattern) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, pattern)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::type_mismatch(format!("date formatted as `{pattern}`"), text))
}
