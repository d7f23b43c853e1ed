use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::options::SpaceEncoding;
use crate::{Error, Result};

/// Everything except the RFC 3986 unreserved characters: ALPHA, DIGIT and
/// `-._~`.
pub const UNRESERVED_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn percent_encode(input: &str) -> Cow<'_, str> {
    percent_encoding::utf8_percent_encode(input, UNRESERVED_ENCODE_SET).into()
}

pub(crate) fn encode_into(out: &mut String, input: &str, spaces: SpaceEncoding) {
    match spaces {
        SpaceEncoding::PercentEscaped => {
            out.extend(percent_encoding::utf8_percent_encode(
                input,
                UNRESERVED_ENCODE_SET,
            ));
        }
        SpaceEncoding::PlusReplaced => {
            for (idx, chunk) in input.split(' ').enumerate() {
                if idx > 0 {
                    out.push('+');
                }
                out.extend(percent_encoding::utf8_percent_encode(
                    chunk,
                    UNRESERVED_ENCODE_SET,
                ));
            }
        }
    }
}

/// Strict percent-decoding: every `%` must introduce two hex digits and the
/// decoded bytes must be UTF-8.
pub fn percent_decode(input: &str) -> Result<Cow<'_, str>> {
    let bytes = input.as_bytes();
    let mut idx = 0;
    while let Some(offset) = memchr::memchr(b'%', &bytes[idx..]) {
        let at = idx + offset;
        let valid = bytes
            .get(at + 1..at + 3)
            .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(Error::MalformedValue(format!(
                "invalid percent escape at byte {at} in `{input}`"
            )));
        }
        idx = at + 3;
    }

    percent_encoding::percent_decode(bytes)
        .decode_utf8()
        .map_err(|err| Error::MalformedValue(format!("invalid utf-8 in `{input}`: {err}")))
}

/// Form decoding: `+` stands for a space, then strict percent-decoding.
pub(crate) fn form_decode(input: &str) -> Result<Cow<'_, str>> {
    if !input.contains('+') {
        return percent_decode(input);
    }
    let spaced = input.replace('+', " ");
    percent_decode(&spaced).map(|decoded| Cow::Owned(decoded.into_owned()))
}
