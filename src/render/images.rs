//! Pre-fetched image sources for photo layers.
//!
//! Fetching is the caller's job and happens before rendering. The store keeps
//! either the encoded bytes (decoded at draw time, so a corrupt file surfaces
//! as an error on the layer that uses it) or already-decoded pixels.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;

use crate::error::CertaError;

#[derive(Debug, Clone)]
enum StoredImage {
    Encoded(Vec<u8>),
    Decoded(RgbaImage),
}

/// Images keyed by the `src` string layers refer to them by.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: HashMap<String, StoredImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn contains(&self, src: &str) -> bool {
        self.images.contains_key(src)
    }

    /// Store encoded image bytes (PNG, JPEG, ...).
    pub fn insert_encoded(&mut self, src: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(src.into(), StoredImage::Encoded(bytes));
    }

    pub fn insert_decoded(&mut self, src: impl Into<String>, image: RgbaImage) {
        self.images.insert(src.into(), StoredImage::Decoded(image));
    }

    /// Read an image file and store it under `src`.
    pub fn load_file(&mut self, src: impl Into<String>, path: impl AsRef<Path>) -> Result<(), CertaError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.insert_encoded(src, bytes);
        Ok(())
    }

    /// Decode every encoded entry in place so repeated renders skip decoding.
    ///
    /// Entries that fail to decode are left encoded and reported again by
    /// the layer that draws them. Returns the number of failures.
    pub fn decode_all(&mut self) -> usize {
        let mut failures = 0;
        for (src, stored) in self.images.iter_mut() {
            let StoredImage::Encoded(bytes) = stored else {
                continue;
            };
            match image::load_from_memory(bytes) {
                Ok(img) => *stored = StoredImage::Decoded(img.to_rgba8()),
                Err(e) => {
                    log::warn!("image '{}' could not be decoded: {}", src, e);
                    failures += 1;
                }
            }
        }
        failures
    }

    /// Pixels for `src` as drawn by `layer_id`.
    ///
    /// `Ok(None)` means the source was never fetched; a source that was
    /// fetched but does not decode is an error naming the layer.
    pub fn image(&self, layer_id: &str, src: &str) -> Result<Option<Cow<'_, RgbaImage>>, CertaError> {
        match self.images.get(src) {
            None => Ok(None),
            Some(StoredImage::Decoded(img)) => Ok(Some(Cow::Borrowed(img))),
            Some(StoredImage::Encoded(bytes)) => {
                let img = image::load_from_memory(bytes).map_err(|e| CertaError::ImageDecode {
                    layer_id: layer_id.to_string(),
                    reason: format!("failed to decode '{}': {}", src, e),
                })?;
                Ok(Some(Cow::Owned(img.to_rgba8())))
            }
        }
    }
}
