//! Field values supplied by the issuing side for one certificate.
//!
//! Values are keyed by layer id. A text layer looks up a [`FieldValue::Text`];
//! a photo layer may be pointed at a different image with a
//! [`FieldValue::Image`] (a member photo, say). Placeholders are the
//! `{{KEY}}` substitutions available to QR data, `CERTIFICATE_URL` being the
//! one every template uses.
//!
//! The JSON form is what the CLI reads:
//!
//! ```json
//! {
//!   "values": {"name": "Andi Budi", "photo": {"image": "members/andi.png"}},
//!   "placeholders": {"CERTIFICATE_URL": "https://example.invalid/c/123"}
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CertaError;

/// Placeholder key for the public verification URL of a certificate.
pub const CERTIFICATE_URL: &str = "CERTIFICATE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// Image source key, looked up in the [`super::ImageStore`].
    Image { image: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    #[serde(default)]
    values: HashMap<String, FieldValue>,
    #[serde(default)]
    placeholders: HashMap<String, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, CertaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_text(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(id, FieldValue::Text(value.into()));
        self
    }

    pub fn with_image(mut self, id: impl Into<String>, src: impl Into<String>) -> Self {
        self.insert(id, FieldValue::Image { image: src.into() });
        self
    }

    pub fn with_placeholder(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(key.into(), value.into());
        self
    }

    pub fn with_certificate_url(self, url: impl Into<String>) -> Self {
        self.with_placeholder(CERTIFICATE_URL, url)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: FieldValue) {
        self.values.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    /// Text value for a layer id.
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.values.get(id)? {
            FieldValue::Text(s) => Some(s),
            FieldValue::Image { .. } => None,
        }
    }

    /// Image source for a layer id.
    pub fn image_src(&self, id: &str) -> Option<&str> {
        match self.values.get(id)? {
            FieldValue::Image { image } => Some(image),
            FieldValue::Text(_) => None,
        }
    }

    /// Value for `{{key}}`: an explicit placeholder, else a text field of that id.
    pub fn placeholder(&self, key: &str) -> Option<&str> {
        self.placeholders
            .get(key)
            .map(String::as_str)
            .or_else(|| self.text(key))
    }
}
