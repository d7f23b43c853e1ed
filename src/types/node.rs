use indexmap::IndexMap;

/// Intermediate tree shared by the encoder and the decoder.
///
/// Map keys are wire names. Leaf strings hold raw text: percent-encoding is
/// applied only when the tree is flattened into a wire string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A rendered scalar, or `None` for a key that carries no value.
    Leaf(Option<String>),
    Map(IndexMap<String, Node>),
    Array(Vec<Node>),
}

impl Node {
    pub fn leaf(value: impl Into<String>) -> Self {
        Node::Leaf(Some(value.into()))
    }

    pub fn null() -> Self {
        Node::Leaf(None)
    }

    pub fn empty_map() -> Self {
        Node::Map(IndexMap::new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Leaf(Some(_)) => "leaf",
            Node::Leaf(None) => "null leaf",
            Node::Map(_) => "map",
            Node::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Leaf(None))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Leaf(Some(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::leaf(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Leaf(Some(value))
    }
}

impl From<Vec<Node>> for Node {
    fn from(values: Vec<Node>) -> Self {
        Node::Array(values)
    }
}

impl From<IndexMap<String, Node>> for Node {
    fn from(map: IndexMap<String, Node>) -> Self {
        Node::Map(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Node::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
