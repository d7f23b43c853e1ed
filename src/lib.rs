//! Serde support for `application/x-www-form-urlencoded` bodies and query
//! strings with bracketed nesting: `user[name]=Ada&user[tags][]=x`.
//!
//! Values pass through an intermediate [`Node`] tree. Encoding serializes a
//! value into the tree and flattens it into pairs; decoding parses pairs into
//! the tree and deserializes the target from it.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Login {
//!     user: String,
//!     remember: Option<bool>,
//! }
//!
//! let login = Login { user: "ada lovelace".into(), remember: Some(true) };
//! let wire = serde_urlform::to_string(&login)?;
//! assert_eq!(wire, "user=ada%20lovelace&remember=true");
//! assert_eq!(serde_urlform::from_str::<Login>(&wire)?, login);
//! # Ok::<(), serde_urlform::Error>(())
//! ```

pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod num;
pub mod options;
mod serde;
pub mod text;
pub mod types;

use std::io::{Read, Write};

use ::serde::de::DeserializeOwned;
use ::serde::Serialize;

pub use crate::decode::{decode_to_node, from_node, parse_key, KeyPath, Segment};
pub use crate::encode::{encode_node, to_node};
pub use crate::error::{Error, ErrorKind};
pub use crate::options::{DecodeOptions, EncodeOptions, NilEncoding, SpaceEncoding};
pub use crate::text::percent::{percent_decode, percent_encode};
pub use crate::types::{
    to_camel_case, to_snake_case, DateDecoder, DateEncoder, DateStrategy, KeyMapping,
    KeyTransform, Node, Timestamp,
};

pub type Result<T> = std::result::Result<T, Error>;

pub fn to_string<T: ?Sized + Serialize>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

pub fn to_string_with_options<T: ?Sized + Serialize>(
    value: &T,
    options: &EncodeOptions,
) -> Result<String> {
    encode::to_string(value, options)
}

pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    to_vec_with_options(value, &EncodeOptions::default())
}

pub fn to_vec_with_options<T: ?Sized + Serialize>(
    value: &T,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    encode::to_vec(value, options)
}

pub fn to_writer<T: ?Sized + Serialize, W: Write>(writer: W, value: &T) -> Result<()> {
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

pub fn to_writer_with_options<T: ?Sized + Serialize, W: Write>(
    writer: W,
    value: &T,
    options: &EncodeOptions,
) -> Result<()> {
    encode::to_writer(writer, value, options)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_str_with_options(input, &DecodeOptions::default())
}

pub fn from_str_with_options<T: DeserializeOwned>(
    input: &str,
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_str(input, options)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, &DecodeOptions::default())
}

pub fn from_slice_with_options<T: DeserializeOwned>(
    input: &[u8],
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_slice(input, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    from_reader_with_options(reader, &DecodeOptions::default())
}

pub fn from_reader_with_options<T: DeserializeOwned, R: Read>(
    reader: R,
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_reader(reader, options)
}
