//! 9-field traffic-source tag encoding
//!
//! Layout: `category.marker.marker.label.ph.ph.ph.ph.ph.` with a trailing
//! dot. The marker fields flag the value as automatically detected; the five
//! placeholder fields are reserved for the richer campaign schema the data
//! layer consumer expects and are never filled here.

use crate::classifier::TrafficSource;
use std::fmt;

/// Number of dot-terminated fields in an encoded tag
pub const FIELD_COUNT: usize = 9;

/// Reserved trailing fields
const PLACEHOLDER_FIELDS: usize = 5;

pub const DEFAULT_AUTO_TAG_MARKER: &str = "auto_tag";
pub const DEFAULT_PLACEHOLDER: &str = "nn";

/// Marker and placeholder notation for encoded tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
    pub auto_tag_marker: String,
    pub placeholder: String,
}

impl Default for TagFormat {
    fn default() -> Self {
        Self {
            auto_tag_marker: DEFAULT_AUTO_TAG_MARKER.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// An encoded traffic-source tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTag {
    fields: [String; FIELD_COUNT],
}

impl EncodedTag {
    pub fn encode(source: &TrafficSource, format: &TagFormat) -> Self {
        let marker = &format.auto_tag_marker;
        let ph = &format.placeholder;
        Self {
            fields: [
                source.category.as_str().to_string(),
                marker.clone(),
                marker.clone(),
                source.label.clone(),
                ph.clone(),
                ph.clone(),
                ph.clone(),
                ph.clone(),
                ph.clone(),
            ],
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn category(&self) -> &str {
        &self.fields[0]
    }

    pub fn label(&self) -> &str {
        &self.fields[3]
    }

    /// The reserved trailing fields
    pub fn reserved(&self) -> &[String] {
        &self.fields[FIELD_COUNT - PLACEHOLDER_FIELDS..]
    }
}

impl fmt::Display for EncodedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            write!(f, "{}.", field)?;
        }
        Ok(())
    }
}
