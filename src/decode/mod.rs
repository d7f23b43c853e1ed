mod key;

use std::io::Read;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

pub use key::{parse_key, KeyPath, Segment};

use crate::constants::{KEY_VALUE_SEPARATOR, PAIR_SEPARATOR};
use crate::serde::de::RootDeserializer;
use crate::text::percent::form_decode;
use crate::{DecodeOptions, Error, Node, Result};

pub fn from_str<T: DeserializeOwned>(input: &str, options: &DecodeOptions) -> Result<T> {
    let node = decode_to_node(input)?;
    from_node(&node, options)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8], options: &DecodeOptions) -> Result<T> {
    let text = std::str::from_utf8(input)
        .map_err(|err| Error::MalformedValue(format!("invalid utf-8: {err}")))?;
    from_str(text, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(
    mut reader: R,
    options: &DecodeOptions,
) -> Result<T> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    from_str(&buf, options)
}

/// Materialize a value from an already parsed tree.
pub fn from_node<T: DeserializeOwned>(node: &Node, options: &DecodeOptions) -> Result<T> {
    T::deserialize(RootDeserializer::new(node, options))
}

/// Parse a wire string into its tree. The root is always a map.
pub fn decode_to_node(input: &str) -> Result<Node> {
    let mut builder = TreeBuilder::new();
    let mut pairs = 0usize;

    for pair in input.split(PAIR_SEPARATOR) {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = match memchr::memchr(KEY_VALUE_SEPARATOR, pair.as_bytes()) {
            Some(split) => (&pair[..split], Some(&pair[split + 1..])),
            None => (pair, None),
        };

        let key = form_decode(raw_key)?;
        let value = raw_value
            .map(|raw| form_decode(raw).map(|decoded| decoded.into_owned()))
            .transpose()?;
        trace!(key = %key, has_value = value.is_some(), "decoded pair");

        let path = parse_key(&key)?;
        builder.insert(&key, &path, value)?;
        pairs += 1;
    }

    debug!(input_len = input.len(), pairs, "decoded wire string");
    Ok(builder.finish())
}

/// Owned, mutable tree under construction; `finish` hands out the result.
struct TreeBuilder {
    root: IndexMap<String, Node>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: IndexMap::new(),
        }
    }

    fn insert(&mut self, raw: &str, path: &[Segment], value: Option<String>) -> Result<()> {
        let Some((Segment::MapKey(name), rest)) = path.split_first() else {
            return Err(Error::malformed_key(raw, "key must start with a name"));
        };
        insert_into_map(&mut self.root, raw, name, rest, value)
    }

    fn finish(self) -> Node {
        Node::Map(self.root)
    }
}

fn insert_into_map(
    map: &mut IndexMap<String, Node>,
    raw: &str,
    name: &str,
    rest: &[Segment],
    value: Option<String>,
) -> Result<()> {
    match rest.split_first() {
        None => {
            if map.contains_key(name) {
                return Err(Error::duplicate_key(raw));
            }
            map.insert(name.to_string(), Node::Leaf(value));
            Ok(())
        }
        Some((Segment::ArrayMarker, tail)) => {
            let entry = map
                .entry(name.to_string())
                .or_insert_with(|| Node::Array(Vec::new()));
            match entry {
                Node::Array(values) => insert_into_array(values, raw, tail, value),
                _ => Err(Error::duplicate_key(raw)),
            }
        }
        Some((Segment::MapKey(child), tail)) => {
            let entry = map.entry(name.to_string()).or_insert_with(Node::empty_map);
            match entry {
                Node::Map(inner) => insert_into_map(inner, raw, child, tail, value),
                _ => Err(Error::duplicate_key(raw)),
            }
        }
    }
}

fn insert_into_array(
    values: &mut Vec<Node>,
    raw: &str,
    rest: &[Segment],
    value: Option<String>,
) -> Result<()> {
    match rest.split_first() {
        None => {
            values.push(Node::Leaf(value));
            Ok(())
        }
        Some((Segment::ArrayMarker, _)) => Err(Error::unsupported_nesting(raw)),
        Some((Segment::MapKey(child), tail)) => {
            // Continue the last element until it already holds this path.
            let reuse_last = matches!(
                values.last(),
                Some(Node::Map(last)) if !would_conflict(last, child, tail)
            );
            if !reuse_last {
                values.push(Node::empty_map());
            }
            match values.last_mut() {
                Some(Node::Map(last)) => insert_into_map(last, raw, child, tail, value),
                _ => Err(Error::duplicate_key(raw)),
            }
        }
    }
}

fn would_conflict(map: &IndexMap<String, Node>, name: &str, rest: &[Segment]) -> bool {
    match (map.get(name), rest.split_first()) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(Node::Array(_)), Some((Segment::ArrayMarker, _))) => false,
        (Some(Node::Map(inner)), Some((Segment::MapKey(child), tail))) => {
            would_conflict(inner, child, tail)
        }
        (Some(_), Some(_)) => true,
    }
}
