use crate::types::{DateStrategy, KeyMapping};

/// What to write for a null leaf (`None`, unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NilEncoding {
    /// Bare key with no `=`: `flag`.
    #[default]
    DropValue,
    /// Omit the pair altogether.
    DropKey,
}

/// How a space is escaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpaceEncoding {
    #[default]
    PercentEscaped,
    PlusReplaced,
}

/// Options for encoding values to a wire string.
///
/// # Examples
/// ```
/// use serde_urlform::{EncodeOptions, KeyMapping};
///
/// let opts = EncodeOptions::new().with_key_mapping(KeyMapping::SnakeCase);
/// let _ = opts;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub key_mapping: KeyMapping,
    pub date_strategy: DateStrategy,
    pub nil_encoding: NilEncoding,
    pub space_encoding: SpaceEncoding,
    pub alphabetize_keys: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_mapping(mut self, key_mapping: KeyMapping) -> Self {
        self.key_mapping = key_mapping;
        self
    }

    pub fn with_date_strategy(mut self, date_strategy: DateStrategy) -> Self {
        self.date_strategy = date_strategy;
        self
    }

    pub fn with_nil_encoding(mut self, nil_encoding: NilEncoding) -> Self {
        self.nil_encoding = nil_encoding;
        self
    }

    pub fn with_space_encoding(mut self, space_encoding: SpaceEncoding) -> Self {
        self.space_encoding = space_encoding;
        self
    }

    /// Sort map entries by wire name before flattening.
    pub fn with_alphabetize_keys(mut self, alphabetize_keys: bool) -> Self {
        self.alphabetize_keys = alphabetize_keys;
        self
    }
}

/// Options for decoding wire strings.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub key_mapping: KeyMapping,
    pub date_strategy: DateStrategy,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_mapping(mut self, key_mapping: KeyMapping) -> Self {
        self.key_mapping = key_mapping;
        self
    }

    pub fn with_date_strategy(mut self, date_strategy: DateStrategy) -> Self {
        self.date_strategy = date_strategy;
        self
    }
}
