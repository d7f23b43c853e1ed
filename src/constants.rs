/// Deepest key path accepted, counted in bracket segments.
pub const MAX_DEPTH: usize = 256;

pub const PAIR_SEPARATOR: char = '&';

pub const KEY_VALUE_SEPARATOR: u8 = b'=';

/// Newtype name that routes `Timestamp` through the date strategy.
pub(crate) const TIMESTAMP_TOKEN: &str = "$__serde_urlform_private_Timestamp";

#[inline]
pub fn is_bracket(ch: char) -> bool {
    matches!(ch, '[' | ']')
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{from_str, to_string, ErrorKind};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Wrapper {
        data: String,
    }

    #[rstest::rstest]
    fn test_is_bracket() {
        assert!(is_bracket('['));
        assert!(is_bracket(']'));
        assert!(!is_bracket('a'));
        assert!(!is_bracket('&'));
    }

    #[rstest::rstest]
    fn test_max_depth_boundary() {
        let ok_key = format!("a{}", "[b]".repeat(MAX_DEPTH - 1));
        assert!(crate::decode_to_node(&format!("{ok_key}=1")).is_ok());

        let too_deep = format!("a{}", "[b]".repeat(MAX_DEPTH));
        let err = crate::decode_to_node(&format!("{too_deep}=1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
    }

    #[rstest::rstest]
    fn test_very_long_string() {
        let value = Wrapper {
            data: "x y&".repeat(25_000),
        };
        let encoded = to_string(&value).unwrap();
        let decoded: Wrapper = from_str(&encoded).unwrap();
        assert_eq!(value, decoded);
    }
}
