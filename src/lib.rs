//! # Mixed Gal
//!
//! A static gallery builder for mixed-media event albums. Your filesystem is
//! the data source: directories become folders, JSON sidecars carry captions
//! and tags, and the images, videos, and HEIC photos inside become assets.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Mixed Gal processes content through three independent stages, each producing
//! a JSON catalog manifest that the next stage consumes:
//!
//! ```text
//! 1. Scan      content/  →  catalog.json     (filesystem → structured data)
//! 2. Convert   catalog   →  converted/       (HEIC → JPEG transcodes)
//! 3. Generate  catalog   →  dist/            (final HTML gallery)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Debuggability**: each manifest is human-readable JSON you can inspect.
//! - **Incremental builds**: the convert stage keeps a content-addressed cache,
//!   so unchanged HEIC files are never transcoded twice.
//! - **Testability**: each stage is a function from manifest to manifest, so
//!   unit tests can exercise pipeline logic without decoding a single image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — walks the content directory, classifies files, reads sidecars, produces the catalog |
//! | [`convert`] | Stage 2 — transcodes HEIC assets to JPEG in parallel, records per-asset outcomes |
//! | [`generate`] | Stage 3 — renders the static HTML gallery from the converted catalog using Maud |
//! | [`classify`] | Extension-based media classification table (`MediaKind`) |
//! | [`view`] | Gallery view state: folder expansion, tag filtering, lightbox position |
//! | [`lightbox`] | Per-asset display dispatch and neighbor navigation with wrap-around |
//! | [`heic`] | Pure-Rust HEIC handling: container parsing, AV1 decode, JPEG encode |
//! | [`cache`] | Content-addressed conversion cache keyed on source bytes and encode params |
//! | [`config`] | `gallery.toml` loading and defaults |
//! | [`types`] | Shared types serialized between stages (`Catalog`, `Folder`, `Asset`) |
//! | [`naming`] | Folder label and badge derivation from directory names |
//! | [`metadata`] | Sidecar JSON, folder descriptions, logo detection |
//! | [`output`] | CLI output formatting — tree-based display of pipeline results |
//!
//! # Design Decisions
//!
//! ## One Controller For View State
//!
//! All interactive semantics — which folders are expanded, which tag filter is
//! active, where the lightbox points — live in [`view::ViewState`], a plain
//! data structure with no HTML in it. The generate stage renders each reachable
//! state as its own static page (folder grids, tag pages, slide pages), so the
//! rules for filtering and wrap-around navigation are unit-tested as ordinary
//! Rust functions rather than scripted through a browser.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system, rather than Handlebars or Tera. Advantages:
//!
//! - **Compile-time checking**: malformed HTML is a build error, not a runtime surprise.
//! - **Type-safe**: template variables are Rust expressions — no stringly-typed lookups.
//! - **XSS-safe by default**: all interpolation is auto-escaped, which matters
//!   when captions come from user-written sidecar files.
//! - **Zero runtime files**: no template directory to ship or get out of sync.
//!
//! ## Pure-Rust HEIC Handling (No libheif, No FFmpeg)
//!
//! The [`heic`] module parses the HEIF container with `avif-parse` and decodes
//! AV1-coded payloads with `rav1d` — both pure Rust, no system libraries. This
//! keeps the binary fully self-contained: no `apt install`, no Homebrew, no
//! version conflicts. HEVC-coded HEIC files (the common iPhone default) have no
//! pure-Rust decoder, so they are reported per asset and rendered as a visible
//! placeholder rather than failing the build.
//!
//! ## Classification Is A Fixed Table
//!
//! [`classify`] maps file extensions to media kinds through one static table.
//! No content sniffing, no magic numbers at scan time — a file named `.heic` is
//! HEIC until the convert stage proves otherwise. Files with unrecognized
//! extensions are kept in the catalog as unsupported assets and surface in the
//! gallery as download-only entries, so nothing a user drops into a folder
//! silently disappears.
//!
//! ## Content-Addressed Conversion Cache
//!
//! The convert stage caches by SHA-256 of the source bytes plus a hash of the
//! encode parameters, not by filename or mtime. Renaming a folder reuses the
//! cached transcode via a copy; touching a file without changing it is still a
//! cache hit; editing a photo or changing `jpeg_quality` re-transcodes exactly
//! the affected assets. Failures are never cached, so transient errors get
//! retried on the next run.

pub mod cache;
pub mod classify;
pub mod config;
pub mod convert;
pub mod generate;
pub mod heic;
pub mod lightbox;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
