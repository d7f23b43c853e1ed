mod date;
mod key_mapping;
mod node;

pub use date::{DateDecoder, DateEncoder, DateStrategy, Timestamp};
pub use key_mapping::{to_camel_case, to_snake_case, KeyMapping, KeyTransform};
pub use node::Node;
