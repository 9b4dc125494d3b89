//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Codec configuration shared by every serializer.

use serde::{Deserialize, Serialize};

/// Default nesting limit for decoding.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default item limit for a single decoded container.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 16 * 1024 * 1024;

/// Options controlling how strictly input is decoded.
///
/// Missing keys take their defaults when loaded from configuration.
///
/// # Examples
///
/// ```rust
/// use schemata::serialization::CodecOptions;
///
/// let options = CodecOptions::new().with_strict(true).with_max_depth(16);
/// assert!(options.strict);
/// assert_eq!(options.max_depth, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Fail on unknown fields instead of skipping them.
    pub strict: bool,

    /// Maximum nesting of messages and containers accepted while decoding.
    pub max_depth: usize,

    /// Maximum number of items accepted in one container or bytes in one
    /// string or binary value.
    pub max_container_len: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_container_len: DEFAULT_MAX_CONTAINER_LEN,
        }
    }
}

impl CodecOptions {
    /// Lenient options with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the container size limit.
    pub fn with_max_container_len(mut self, max_container_len: usize) -> Self {
        self.max_container_len = max_container_len;
        self
    }
}

/// How JSON identifies fields or enum constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Numeric field keys and enum values.
    #[default]
    Id,
    /// Field names and enum constant names.
    Name,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CodecOptions::default();
        assert!(!options.strict);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(options.max_container_len, DEFAULT_MAX_CONTAINER_LEN);
        assert_eq!(IdType::default(), IdType::Id);
    }

    #[test]
    fn test_load_from_json() {
        let options: CodecOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert!(options.strict);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        let mode: IdType = serde_json::from_str(r#""name""#).unwrap();
        assert_eq!(mode, IdType::Name);
    }

    #[test]
    fn test_builder_methods() {
        let options = CodecOptions::new().with_max_container_len(10);
        assert_eq!(options.max_container_len, 10);
    }
}
