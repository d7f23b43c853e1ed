use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::constants::{is_bracket, KEY_VALUE_SEPARATOR, MAX_DEPTH, PAIR_SEPARATOR};
use crate::options::{EncodeOptions, NilEncoding};
use crate::decode::{KeyPath, Segment};
use crate::text::percent::encode_into;
use crate::{Error, Node, Result};

/// Flattens a map tree into `key=value` pairs.
///
/// The writer keeps one growing key prefix; every leaf emits the prefix as its
/// key, so nothing is allocated per pair beyond the output buffer.
pub(crate) struct Writer<'o> {
    buffer: String,
    prefix: String,
    options: &'o EncodeOptions,
    pairs: usize,
}

impl<'o> Writer<'o> {
    pub fn new(options: &'o EncodeOptions) -> Self {
        Self {
            buffer: String::new(),
            prefix: String::new(),
            options,
            pairs: 0,
        }
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_root(&mut self, root: &IndexMap<String, Node>) -> Result<()> {
        self.write_map(root, 0)
    }

    fn write_node(&mut self, node: &Node, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::malformed_key(self.prefix.as_str(), "key nests too deeply"));
        }
        match node {
            Node::Leaf(Some(value)) => {
                self.begin_pair();
                self.buffer.push_str(&self.prefix);
                self.buffer.push(char::from(KEY_VALUE_SEPARATOR));
                encode_into(&mut self.buffer, value, self.options.space_encoding);
                Ok(())
            }
            Node::Leaf(None) => {
                if self.options.nil_encoding == NilEncoding::DropValue {
                    self.begin_pair();
                    self.buffer.push_str(&self.prefix);
                }
                Ok(())
            }
            Node::Map(map) => self.write_map(map, depth),
            Node::Array(values) => self.write_array(values, depth),
        }
    }

    fn write_map(&mut self, map: &IndexMap<String, Node>, depth: usize) -> Result<()> {
        if self.options.alphabetize_keys {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (key, child) in entries {
                self.write_entry(key, child, depth)?;
            }
        } else {
            for (key, child) in map {
                self.write_entry(key, child, depth)?;
            }
        }
        Ok(())
    }

    fn write_entry(&mut self, key: &str, child: &Node, depth: usize) -> Result<()> {
        if key.is_empty() {
            return Err(Error::malformed_key(
                format!("{}[]", self.prefix),
                "map keys must not be empty",
            ));
        }
        if key.chars().any(is_bracket) {
            return Err(Error::malformed_key(key, "brackets are reserved for nesting"));
        }

        let mark = self.prefix.len();
        if depth == 0 {
            encode_into(&mut self.prefix, key, self.options.space_encoding);
        } else {
            self.prefix.push('[');
            encode_into(&mut self.prefix, key, self.options.space_encoding);
            self.prefix.push(']');
        }
        let result = self.write_node(child, depth + 1);
        self.prefix.truncate(mark);
        result
    }

    fn write_array(&mut self, values: &[Node], depth: usize) -> Result<()> {
        let mark = self.prefix.len();
        self.prefix.push_str("[]");
        let result = self.write_elements(values, depth);
        self.prefix.truncate(mark);
        result
    }

    /// Readers continue the last map element until a pair repeats one of its
    /// paths, so every map element must open with a path the previous map
    /// element already wrote.
    fn write_elements(&mut self, values: &[Node], depth: usize) -> Result<()> {
        let mut previous: Option<&Node> = None;
        for value in values {
            match value {
                Node::Array(_) => {
                    return Err(Error::unsupported_nesting(format!("{}[]", self.prefix)));
                }
                Node::Map(map) => {
                    let first = self.first_path(map);
                    if let (Some(Node::Map(last)), Some(first)) = (previous, first) {
                        if !self.holds_path(last, &first) {
                            return Err(Error::ambiguous_element(self.prefix.as_str()));
                        }
                    }
                }
                Node::Leaf(_) => {}
            }
            self.write_node(value, depth + 1)?;
            if self.emits(value) {
                previous = Some(value);
            }
        }
        Ok(())
    }

    fn emits(&self, node: &Node) -> bool {
        match node {
            Node::Leaf(Some(_)) => true,
            Node::Leaf(None) => self.options.nil_encoding == NilEncoding::DropValue,
            Node::Map(map) => map.values().any(|child| self.emits(child)),
            Node::Array(values) => values.iter().any(|value| self.emits(value)),
        }
    }

    /// Path of the first pair written for `map`, relative to the element.
    fn first_path(&self, map: &IndexMap<String, Node>) -> Option<KeyPath> {
        let mut path = KeyPath::new();
        self.first_path_in_map(map, &mut path).then_some(path)
    }

    fn first_path_in_map(&self, map: &IndexMap<String, Node>, path: &mut KeyPath) -> bool {
        let mut entries: Vec<_> = map.iter().collect();
        if self.options.alphabetize_keys {
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        }
        for (key, child) in entries {
            path.push(Segment::MapKey(SmolStr::new(key)));
            if self.first_path_in_node(child, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    fn first_path_in_node(&self, node: &Node, path: &mut KeyPath) -> bool {
        match node {
            Node::Leaf(_) => self.emits(node),
            Node::Map(map) => self.first_path_in_map(map, path),
            Node::Array(values) => {
                path.push(Segment::ArrayMarker);
                if values.iter().any(|value| self.first_path_in_node(value, path)) {
                    return true;
                }
                path.pop();
                false
            }
        }
    }

    /// Whether the written pairs of `map` already hold `path`, which makes a
    /// reader start a new element there.
    fn holds_path(&self, map: &IndexMap<String, Node>, path: &[Segment]) -> bool {
        let Some((Segment::MapKey(name), rest)) = path.split_first() else {
            return false;
        };
        let Some(node) = map.get(name.as_str()).filter(|node| self.emits(node)) else {
            return false;
        };
        match (node, rest.first()) {
            (_, None) => true,
            (Node::Array(_), Some(Segment::ArrayMarker)) => false,
            (Node::Map(inner), Some(Segment::MapKey(_))) => self.holds_path(inner, rest),
            _ => true,
        }
    }

    fn begin_pair(&mut self) {
        if self.pairs > 0 {
            self.buffer.push(PAIR_SEPARATOR);
        }
        self.pairs += 1;
    }
}
