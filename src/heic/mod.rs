//! HEIC transcoding — pure Rust, no system codec libraries.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Container parse** | `avif-parse` |
//! | **AV1 decode** | `rav1d` + custom BT.601 YUV→RGB |
//! | **JPEG encode** | `image` crate |
//! | **HEVC payloads** | detected and rejected (no pure Rust decoder exists) |
//!
//! The module is split into:
//! - **Codec**: [`HeicCodec`] trait + [`JpegQuality`] — the pixel-work seam
//! - **Av1**: [`Av1HeifCodec`], the production implementation
//! - **Service**: [`Converter`] — in-flight dedup and per-run result caching

pub mod av1;
pub mod codec;
pub mod service;

pub use av1::Av1HeifCodec;
pub use codec::{CodecError, HeicCodec, JpegQuality};
pub use service::{Conversion, Converter};
