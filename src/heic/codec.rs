//! Transcoding codec trait and shared types.
//!
//! The [`HeicCodec`] trait is the seam between the convert stage and the
//! pixel-level machinery: container bytes in, JPEG bytes out. Implementations
//! never touch the filesystem — the caller owns all I/O — so the same codec
//! works against real files, in-memory fixtures, and mocks.
//!
//! The production implementation is [`Av1HeifCodec`](super::av1::Av1HeifCodec).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("container parse failed: {0}")]
    Container(String),
    #[error("unsupported payload: {0}")]
    UnsupportedPayload(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("JPEG encode failed: {0}")]
    Encode(String),
}

/// Quality setting for JPEG encoding (1-100). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegQuality(pub u32);

impl JpegQuality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for JpegQuality {
    fn default() -> Self {
        Self(85)
    }
}

/// Trait for HEIC-to-JPEG transcoders.
///
/// `Sync` so a single codec instance can be shared across rayon workers.
pub trait HeicCodec: Sync {
    /// Transcode one HEIC container into a complete JPEG file.
    fn transcode(&self, bytes: &[u8], quality: JpegQuality) -> Result<Vec<u8>, CodecError>;
}
