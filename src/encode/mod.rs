mod writer;

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::{EncodeOptions, Error, Node, Result};

/// Encode any serializable value to a wire string.
///
/// Only keyed values (structs, maps) may sit at the root.
///
/// # Examples
/// ```
/// use serde::Serialize;
/// use serde_urlform::{to_string_with_options, EncodeOptions, KeyMapping};
///
/// #[derive(Serialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Search {
///     page_size: u32,
///     tags: Vec<String>,
/// }
///
/// let search = Search {
///     page_size: 20,
///     tags: vec!["rust".into(), "serde".into()],
/// };
/// let options = EncodeOptions::new().with_key_mapping(KeyMapping::SnakeCase);
/// let wire = to_string_with_options(&search, &options)?;
/// assert_eq!(wire, "page_size=20&tags[]=rust&tags[]=serde");
/// # Ok::<(), serde_urlform::Error>(())
/// ```
pub fn to_string<T: ?Sized + Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    let node = to_node(value, options)?;
    encode_node(&node, options)
}

pub fn to_vec<T: ?Sized + Serialize>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>> {
    to_string(value, options).map(String::into_bytes)
}

pub fn to_writer<T: ?Sized + Serialize, W: Write>(
    mut writer: W,
    value: &T,
    options: &EncodeOptions,
) -> Result<()> {
    let encoded = to_string(value, options)?;
    writer.write_all(encoded.as_bytes())?;
    Ok(())
}

/// Build the intermediate tree for a value without flattening it.
pub fn to_node<T: ?Sized + Serialize>(value: &T, options: &EncodeOptions) -> Result<Node> {
    crate::serde::ser::to_node(value, options)
}

/// Flatten a tree into `key=value` pairs joined by `&`.
pub fn encode_node(node: &Node, options: &EncodeOptions) -> Result<String> {
    let Node::Map(root) = node else {
        return Err(Error::unsupported_root(node.type_name()));
    };

    let mut writer = writer::Writer::new(options);
    writer.write_root(root)?;
    debug!(pairs = writer.pairs(), "encoded wire string");
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;
    use serde::Serialize;

    use super::*;
    use crate::{ErrorKind, KeyMapping, NilEncoding};

    #[derive(Serialize)]
    struct Nested {
        query: Query,
    }

    #[derive(Serialize)]
    struct Query {
        foo: String,
        bar: u32,
    }

    #[rstest]
    fn test_nested_struct() {
        let value = Nested {
            query: Query {
                foo: "foo".to_string(),
                bar: 1,
            },
        };
        let out = to_string(&value, &EncodeOptions::default()).unwrap();
        assert_eq!(out, "query[foo]=foo&query[bar]=1");
    }

    #[rstest]
    #[case::integer(to_string(&42, &EncodeOptions::default()))]
    #[case::string(to_string("plain", &EncodeOptions::default()))]
    #[case::sequence(to_string(&vec![1, 2], &EncodeOptions::default()))]
    #[case::none(to_string(&Option::<BTreeMap<String, u8>>::None, &EncodeOptions::default()))]
    fn test_root_must_be_keyed(#[case] result: Result<String>) {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnsupportedRootShape);
    }

    #[rstest]
    fn test_map_keys_are_not_mapped() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Filters {
            sort_order: String,
            extra: BTreeMap<String, String>,
        }

        let value = Filters {
            sort_order: "asc".to_string(),
            extra: BTreeMap::from([("camelKey".to_string(), "v".to_string())]),
        };
        let options = EncodeOptions::new().with_key_mapping(KeyMapping::SnakeCase);
        let out = to_string(&value, &options).unwrap();
        assert_eq!(out, "sort_order=asc&extra[camelKey]=v");
    }

    #[rstest]
    fn test_to_writer_and_vec_agree() {
        let value = BTreeMap::from([("a", Some(1)), ("b", None)]);
        let options = EncodeOptions::new().with_nil_encoding(NilEncoding::DropKey);
        let mut sink = Vec::new();
        to_writer(&mut sink, &value, &options).unwrap();
        assert_eq!(sink, to_vec(&value, &options).unwrap());
        assert_eq!(sink, b"a=1");
    }
}
