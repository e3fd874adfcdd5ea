#![warn(missing_docs)]
//! # threat-scope-intake
//!
//! ## Purpose
//! Provides image payload intake and validation ahead of the analysis
//! pipeline.
//!
//! ## Responsibilities
//! - Sniff supported image formats from magic bytes.
//! - Enforce non-empty and bounded payload sizes.
//! - Derive a stable content digest used as submission identity.
//! - Expose a source abstraction with a deterministic synthetic variant for
//!   tests and CI.
//!
//! ## Data flow
//! A picker/camera collaborator yields raw bytes -> [`ImagePayload::from_bytes`]
//! validates and digests them -> the pipeline consumes the owned payload.
//!
//! ## Ownership and lifetimes
//! Payloads own their byte buffers; no borrowed file-picker memory escapes the
//! intake boundary.
//!
//! ## Error model
//! Empty, oversized, and non-image buffers are reported as [`IntakeError`]
//! values; the pipeline surfaces them as decode failures.
//!
//! ## Security and privacy notes
//! Intake never persists payload bytes; only the hex digest appears in logs.

use hex::encode as hex_encode;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Default upper bound for accepted payloads (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Image container formats accepted by intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG/JFIF.
    Jpeg,
    /// PNG.
    Png,
    /// GIF 87a/89a.
    Gif,
    /// RIFF WebP.
    WebP,
}

impl ImageFormat {
    /// Returns the canonical MIME type for the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }
}

/// Identifies a supported image format from leading magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some(ImageFormat::WebP);
    }
    None
}

/// Intake configuration shared by all submissions of one dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Maximum accepted payload size in bytes.
    pub max_bytes: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Validated image payload ready for analysis submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Original file name as reported by the picker collaborator.
    pub file_name: String,
    /// Sniffed container format.
    pub format: ImageFormat,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// Lowercase hex sha-256 over `bytes`; submission identity.
    pub digest_hex: String,
}

impl ImagePayload {
    /// Validates raw picker bytes into an owned payload.
    ///
    /// # Errors
    /// Returns [`IntakeError::EmptyPayload`] for zero-length buffers,
    /// [`IntakeError::OversizedPayload`] beyond `config.max_bytes`, and
    /// [`IntakeError::UnsupportedFormat`] when no known magic bytes match.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        config: &IntakeConfig,
    ) -> Result<Self, IntakeError> {
        if bytes.is_empty() {
            return Err(IntakeError::EmptyPayload);
        }
        if bytes.len() > config.max_bytes {
            return Err(IntakeError::OversizedPayload {
                actual: bytes.len(),
                max: config.max_bytes,
            });
        }
        let format = sniff_format(&bytes).ok_or(IntakeError::UnsupportedFormat)?;
        let digest_hex = content_digest_hex(&bytes);

        Ok(Self {
            file_name: file_name.into(),
            format,
            bytes,
            digest_hex,
        })
    }

    /// Returns payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for zero-length payloads. Unreachable for payloads built
    /// through [`ImagePayload::from_bytes`].
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Derives a deterministic u64 seed from the content digest.
    ///
    /// Used by seedable synthesizers so the same image always yields the same
    /// mock report.
    pub fn digest_seed(&self) -> u64 {
        u64::from_str_radix(&self.digest_hex[..16], 16).unwrap_or(0)
    }
}

/// Computes the lowercase hex sha-256 digest of a raw buffer.
///
/// Matches [`ImagePayload::digest_hex`] for buffers that validate; also used
/// to identify submissions whose payloads fail decoding.
pub fn content_digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(hasher.finalize())
}

/// Trait implemented by concrete image providers (picker, camera, fixtures).
pub trait ImageSource: Send + Sync {
    /// Produces the next image payload from this source.
    ///
    /// # Errors
    /// Returns [`IntakeError`] when the source yields an invalid buffer.
    fn next_image(&self, config: &IntakeConfig) -> Result<ImagePayload, IntakeError>;
}

/// Deterministic synthetic source for tests and the demo shell.
#[derive(Debug, Clone)]
pub struct SyntheticImageSource {
    file_name: String,
    body_len: usize,
    fill: u8,
}

impl SyntheticImageSource {
    /// Creates a source yielding a minimal JPEG-tagged buffer.
    pub fn new(file_name: impl Into<String>, body_len: usize, fill: u8) -> Self {
        Self {
            file_name: file_name.into(),
            body_len,
            fill,
        }
    }
}

impl ImageSource for SyntheticImageSource {
    fn next_image(&self, config: &IntakeConfig) -> Result<ImagePayload, IntakeError> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend(std::iter::repeat_n(self.fill, self.body_len));
        ImagePayload::from_bytes(self.file_name.clone(), bytes, config)
    }
}

/// Intake layer error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// Payload bytes are empty.
    #[error("image payload is empty")]
    EmptyPayload,
    /// Payload exceeds the configured size bound.
    #[error("image payload too large: {actual} bytes (max {max})")]
    OversizedPayload {
        /// Received payload size.
        actual: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Buffer does not start with a supported image signature.
    #[error("unsupported or non-image payload")]
    UnsupportedFormat,
}
