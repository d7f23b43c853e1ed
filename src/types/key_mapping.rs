use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub type KeyTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Translation between struct field names and wire names.
///
/// `encode` maps a field name to its wire name, `decode` maps a wire name
/// back to a field name. Only struct fields are mapped; keys of maps are data
/// and pass through untouched.
#[derive(Clone, Default)]
pub enum KeyMapping {
    #[default]
    UseDefaultKeys,
    /// `fooBar` on the struct, `foo_bar` on the wire.
    SnakeCase,
    /// `foo_bar` on the struct, `fooBar` on the wire.
    CamelCase,
    Custom {
        encode: KeyTransform,
        decode: KeyTransform,
    },
}

impl KeyMapping {
    pub fn custom<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&str) -> String + Send + Sync + 'static,
        D: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyMapping::Custom {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    /// Field name to wire name.
    pub fn encode<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self {
            KeyMapping::UseDefaultKeys => Cow::Borrowed(key),
            KeyMapping::SnakeCase => Cow::Owned(to_snake_case(key)),
            KeyMapping::CamelCase => Cow::Owned(to_camel_case(key)),
            KeyMapping::Custom { encode, .. } => Cow::Owned(encode(key)),
        }
    }

    /// Wire name to field name.
    pub fn decode<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self {
            KeyMapping::UseDefaultKeys => Cow::Borrowed(key),
            KeyMapping::SnakeCase => Cow::Owned(to_camel_case(key)),
            KeyMapping::CamelCase => Cow::Owned(to_snake_case(key)),
            KeyMapping::Custom { decode, .. } => Cow::Owned(decode(key)),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, KeyMapping::UseDefaultKeys)
    }
}

impl fmt::Debug for KeyMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMapping::UseDefaultKeys => f.write_str("UseDefaultKeys"),
            KeyMapping::SnakeCase => f.write_str("SnakeCase"),
            KeyMapping::CamelCase => f.write_str("CamelCase"),
            KeyMapping::Custom { .. } => f.write_str("Custom"),
        }
    }
}

/// `testJSON` -> `test_json`, `JSONValue` -> `json_value`.
///
/// An uppercase letter opens a new word when it follows a lowercase letter or
/// a digit, or when it is the last capital of a run that continues in
/// lowercase.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && idx > 0 {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());
            let starts_word = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if starts_word {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// `foo_bar` -> `fooBar`. Leading and trailing underscores are kept.
pub fn to_camel_case(key: &str) -> String {
    let Some(first) = key.find(|ch: char| ch != '_') else {
        return key.to_string();
    };
    let end = key
        .char_indices()
        .rev()
        .find(|(_, ch)| *ch != '_')
        .map_or(key.len(), |(idx, ch)| idx + ch.len_utf8());
    let (head, body, tail) = (&key[..first], &key[first..end], &key[end..]);

    if !body.contains('_') {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    out.push_str(head);
    let mut upper_next = false;
    for ch in body.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out.push_str(tail);
    out
}
