use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{self, Impossible, Serialize};

use crate::constants::TIMESTAMP_TOKEN;
use crate::num::number::{format_f32, format_f64, format_int};
use crate::{EncodeOptions, Error, Node, Result};

/// Builds a [`Node`] tree from any `Serialize` value.
///
/// The tree is returned as-is; whether it may sit at the root of a wire
/// string is checked by the caller.
pub(crate) fn to_node<T: ?Sized + Serialize>(value: &T, options: &EncodeOptions) -> Result<Node> {
    value.serialize(NodeSerializer { options })
}

#[derive(Clone, Copy)]
pub(crate) struct NodeSerializer<'o> {
    options: &'o EncodeOptions,
}

impl NodeSerializer<'_> {
    fn serialize_timestamp<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        let rendered = value.serialize(self)?;
        if self.options.date_strategy.is_deferred() {
            return Ok(rendered);
        }
        let text = rendered
            .as_str()
            .ok_or_else(|| Error::type_mismatch("RFC 3339 date", rendered.type_name()))?;
        let parsed = DateTime::parse_from_rfc3339(text)
            .map_err(|_| Error::type_mismatch("RFC 3339 date", text))?;
        self.options
            .date_strategy
            .encode(&parsed.with_timezone(&Utc))
    }
}

impl<'o> ser::Serializer for NodeSerializer<'o> {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SerializeArray<'o>;
    type SerializeTuple = SerializeArray<'o>;
    type SerializeTupleStruct = SerializeArray<'o>;
    type SerializeTupleVariant = SerializeTupleVariant<'o>;
    type SerializeMap = SerializeMap<'o>;
    type SerializeStruct = SerializeStruct<'o>;
    type SerializeStructVariant = SerializeStructVariant<'o>;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::leaf(if v { "true" } else { "false" }))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::leaf(format_int(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::leaf(format_f32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::leaf(format_f64(v)))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::leaf(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::leaf(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        Ok(Node::leaf(BASE64.encode(v)))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::null())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::leaf(variant))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        if name == TIMESTAMP_TOKEN {
            return self.serialize_timestamp(value);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        let mut map = IndexMap::with_capacity(1);
        map.insert(variant.to_string(), value.serialize(self)?);
        Ok(Node::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeArray::new(self, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(SerializeArray::new(self, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(SerializeArray::new(self, Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            elements: SerializeArray::new(self, Some(len)),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            serializer: self,
            map: IndexMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(SerializeStruct::new(self, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            fields: SerializeStruct::new(self, len),
        })
    }
}

/// Unkeyed container: elements append in order and may not be arrays.
pub(crate) struct SerializeArray<'o> {
    serializer: NodeSerializer<'o>,
    elements: Vec<Node>,
}

impl<'o> SerializeArray<'o> {
    fn new(serializer: NodeSerializer<'o>, len: Option<usize>) -> Self {
        SerializeArray {
            serializer,
            elements: Vec::with_capacity(len.unwrap_or(0)),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let node = value.serialize(self.serializer)?;
        if let Node::Array(_) = node {
            return Err(Error::unsupported_nesting(format!(
                "[{}]",
                self.elements.len()
            )));
        }
        self.elements.push(node);
        Ok(())
    }

    fn finish(self) -> Node {
        Node::Array(self.elements)
    }
}

impl ser::SerializeSeq for SerializeArray<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeArray<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeArray<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(self.finish())
    }
}

pub(crate) struct SerializeTupleVariant<'o> {
    variant: &'static str,
    elements: SerializeArray<'o>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value)
    }

    fn end(self) -> Result<Node> {
        let mut map = IndexMap::with_capacity(1);
        map.insert(self.variant.to_string(), self.elements.finish());
        Ok(Node::Map(map))
    }
}

/// Map literal: keys are data and skip the key mapping.
pub(crate) struct SerializeMap<'o> {
    serializer: NodeSerializer<'o>,
    map: IndexMap<String, Node>,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("value serialized before key"))?;
        self.map.insert(key, value.serialize(self.serializer)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.map))
    }
}

/// Keyed container: field names go through the key mapping.
pub(crate) struct SerializeStruct<'o> {
    serializer: NodeSerializer<'o>,
    map: IndexMap<String, Node>,
}

impl<'o> SerializeStruct<'o> {
    fn new(serializer: NodeSerializer<'o>, len: usize) -> Self {
        SerializeStruct {
            serializer,
            map: IndexMap::with_capacity(len),
        }
    }

    fn insert<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let wire_name = self.serializer.options.key_mapping.encode(key).into_owned();
        self.map.insert(wire_name, value.serialize(self.serializer)?);
        Ok(())
    }
}

impl ser::SerializeStruct for SerializeStruct<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key, value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.map))
    }
}

pub(crate) struct SerializeStructVariant<'o> {
    variant: &'static str,
    fields: SerializeStruct<'o>,
}

impl ser::SerializeStructVariant for SerializeStructVariant<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.insert(key, value)
    }

    fn end(self) -> Result<Node> {
        let mut map = IndexMap::with_capacity(1);
        map.insert(self.variant.to_string(), Node::Map(self.fields.map));
        Ok(Node::Map(map))
    }
}

struct KeySerializer;

fn key_error(shape: &str) -> Error {
    Error::Message(format!("{shape} cannot be a map key"))
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(if v { "true" } else { "false" }.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(format_int(v))
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(format_f32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(format_f64(v))
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_error("byte array"))
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_error("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_error("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_error("unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_error("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_error("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_error("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_error("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_error("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_error("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_error("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_error("struct variant"))
    }
}
