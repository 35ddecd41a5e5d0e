//! # Error Types
//!
//! This module defines error types used throughout the certa library.
//!
//! Rendering degrades silently wherever it can (missing fonts, bad metrics,
//! unknown enum values). The variants here are the conditions that cannot be
//! papered over: a photo whose bytes do not decode, a QR payload that does not
//! fit, or a drawing surface that refuses an operation. Those carry the id of
//! the offending layer so a batch can report per certificate.

use thiserror::Error;

/// Failure reported by a drawing surface primitive.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The destination geometry cannot be drawn (zero or non-finite size).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Main error type for certa operations
#[derive(Debug, Error)]
pub enum CertaError {
    /// A photo layer's image source exists but could not be decoded.
    #[error("Layer '{layer_id}': image could not be decoded: {reason}")]
    ImageDecode { layer_id: String, reason: String },

    /// A QR layer's payload could not be encoded.
    #[error("Layer '{layer_id}': QR code generation failed: {reason}")]
    QrCode { layer_id: String, reason: String },

    /// The drawing surface failed while drawing a layer.
    #[error("Layer '{layer_id}': surface error: {source}")]
    Surface {
        layer_id: String,
        #[source]
        source: SurfaceError,
    },

    /// Invalid template or command-line configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Font bytes could not be parsed
    #[error("Font error: {0}")]
    Font(String),

    /// Raster output could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CertaError {
    /// The id of the layer this error belongs to, if it is layer-scoped.
    pub fn layer_id(&self) -> Option<&str> {
        match self {
            CertaError::ImageDecode { layer_id, .. }
            | CertaError::QrCode { layer_id, .. }
            | CertaError::Surface { layer_id, .. } => Some(layer_id),
            _ => None,
        }
    }

    pub(crate) fn surface(layer_id: &str, source: SurfaceError) -> Self {
        CertaError::Surface {
            layer_id: layer_id.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_id_for_layer_errors() {
        let err = CertaError::ImageDecode {
            layer_id: "photo".into(),
            reason: "bad png".into(),
        };
        assert_eq!(err.layer_id(), Some("photo"));
        assert!(err.to_string().contains("photo"));

        let err = CertaError::surface("name", SurfaceError::Backend("gone".into()));
        assert_eq!(err.layer_id(), Some("name"));
    }

    #[test]
    fn test_layer_id_absent_for_global_errors() {
        let err = CertaError::Config("missing canvas".into());
        assert_eq!(err.layer_id(), None);
    }
}
