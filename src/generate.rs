//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Takes the converted catalog manifest and
//! generates the final static gallery.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): every folder as an expandable card with
//!   its asset grid inside
//! - **Tag pages** (`/tags/{tag}/index.html`): the same folder list filtered
//!   to assets carrying one tag
//! - **Slide pages** (`/{folder}/{n}.html`): full-screen viewer with wrap
//!   navigation, one page per asset in folder order
//!
//! Slide pages are numbered over the folder's **full** asset list, so a
//! filtered grid on a tag page links into the same canonical pages — slide
//! `3.html` is the same photo no matter which view opened it.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Home page, all folders
//! ├── tags/
//! │   └── ceremony/
//! │       └── index.html         # Filtered view
//! └── spring-gala/
//!     ├── 1.html                 # Slide pages
//!     ├── 2.html
//!     ├── dance.jpg              # Source media (copied)
//!     ├── logo.png
//!     └── toast.heic.jpg         # Converted JPEG (copied)
//! ```
//!
//! Original files are copied next to their slide pages — images and videos
//! are served as-is, and every non-video slide offers its original for
//! download. Converted JPEGs come from the converted directory; its
//! manifests stay behind.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined into every page:
//! - `static/gallery.css`: the whole theme
//! - `static/gallery.js`: video poster/player handoff, keyboard navigation,
//!   fragment-driven folder expansion
//!
//! Folders expand with the browser-native `<details>` element, so the index
//! works with JavaScript disabled.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::GalleryConfig;
use crate::lightbox::{self, SlideMedia};
use crate::naming;
use crate::types::{Asset, Catalog, Folder};
use crate::view::{self, ALL_TAG, ViewState};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS: &str = include_str!("../static/gallery.css");
const JS: &str = include_str!("../static/gallery.js");

pub fn generate(
    manifest_path: &Path,
    converted_dir: &Path,
    source_root: &Path,
    output_dir: &Path,
) -> Result<(), GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let catalog: Catalog = serde_json::from_str(&manifest_content)?;

    fs::create_dir_all(output_dir)?;

    // Media first: source files as scanned, then converted JPEGs on top
    copy_media(&catalog, source_root, output_dir)?;
    if converted_dir.is_dir() {
        copy_dir_recursive(converted_dir, output_dir)?;
    }

    // Index page
    let index_html = render_index(&catalog);
    fs::write(output_dir.join("index.html"), index_html.into_string())?;

    // Tag pages ("all" is the index itself)
    for tag in view::tag_universe(&catalog).iter().skip(1) {
        let tag_dir = output_dir.join("tags").join(tag_slug(tag));
        fs::create_dir_all(&tag_dir)?;
        let tag_html = render_tag_page(&catalog, tag);
        fs::write(tag_dir.join("index.html"), tag_html.into_string())?;
    }

    // Slide pages, numbered over the full asset list
    for folder in &catalog.folders {
        let folder_dir = output_dir.join(&folder.name);
        fs::create_dir_all(&folder_dir)?;
        for index in 0..folder.assets.len() {
            let slide_html = render_slide_page(&catalog, folder, index);
            let filename = format!("{}.html", index + 1);
            fs::write(folder_dir.join(filename), slide_html.into_string())?;
        }
    }

    Ok(())
}

/// Copy every source media file (assets and logos) into the output tree,
/// preserving source-relative paths.
fn copy_media(catalog: &Catalog, source_root: &Path, output_dir: &Path) -> std::io::Result<()> {
    for folder in &catalog.folders {
        for asset in folder.assets.iter().chain(&folder.logo) {
            let from = source_root.join(&asset.path);
            let to = output_dir.join(&asset.path);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else if src_path.extension().map(|e| e != "json").unwrap_or(true) {
            // Skip catalog.json and the cache manifest, copy everything else
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// ============================================================================
// URL helpers
// ============================================================================

/// Relative prefix back to the site root for a page `depth` directories deep.
fn rel_prefix(depth: usize) -> String {
    "../".repeat(depth)
}

/// URL form of a source-relative path: components joined with forward
/// slashes regardless of platform.
fn href(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory name for a tag page. Tags are free-form sidecar strings, so
/// anything that can't sit in a path segment becomes a hyphen.
pub fn tag_slug(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// 1-based slide page number: the asset's position in the folder's full
/// list. Filtered grids borrow from the same folder, so pointer identity
/// finds the right slot even when two files have identical metadata.
fn slide_number(folder: &Folder, asset: &Asset) -> usize {
    folder
        .assets
        .iter()
        .position(|a| std::ptr::eq(a, asset))
        .map_or(1, |i| i + 1)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the site header: heading plus the tag filter bar
fn site_header(heading: Markup, tag_bar: Markup) -> Markup {
    html! {
        header.site-header {
            (heading)
            (tag_bar)
        }
    }
}

/// Renders the tag filter bar. "all" links to the index; every other tag
/// links to its tag page. The active tag is highlighted.
fn render_tag_bar(tags: &[String], active: &str, prefix: &str) -> Markup {
    html! {
        nav.tag-bar {
            @for tag in tags {
                @let target = if tag == ALL_TAG {
                    format!("{prefix}index.html")
                } else {
                    format!("{}tags/{}/index.html", prefix, tag_slug(tag))
                };
                a.tag-link.current[tag == active] href=(target) { (tag) }
            }
        }
    }
}

/// Renders a folder as an expandable card: logo or badge, label, count,
/// description, and the asset grid.
fn render_folder_card(
    folder: &Folder,
    effective: &[&Asset],
    config: &GalleryConfig,
    prefix: &str,
) -> Markup {
    html! {
        details.folder id=(folder.name) {
            summary.folder-card {
                (folder_mark(folder, prefix))
                span.folder-label { (folder.label) }
                span.folder-count {
                    (effective.len()) @if effective.len() == 1 { " item" } @else { " items" }
                }
            }
            @if let Some(description) = &folder.description {
                div.folder-description { (PreEscaped(render_markdown(description))) }
            }
            @if effective.is_empty() {
                p.empty-note { "Nothing to show here." }
            } @else {
                div.asset-grid {
                    @for asset in effective {
                        (render_thumb(folder, asset, config, prefix))
                    }
                }
            }
        }
    }
}

/// Folder identity mark: the logo if the folder has one, otherwise an
/// initial-letter badge.
fn folder_mark(folder: &Folder, prefix: &str) -> Markup {
    match &folder.logo {
        Some(logo) => html! {
            img.folder-logo src={ (prefix) (href(&logo.path)) } alt={ (folder.label) " logo" };
        },
        None => html! {
            span.folder-badge aria-hidden="true" { (naming::initial_badge(&folder.name)) }
        },
    }
}

/// Renders one grid thumbnail, linked to the asset's canonical slide page.
fn render_thumb(
    folder: &Folder,
    asset: &Asset,
    config: &GalleryConfig,
    prefix: &str,
) -> Markup {
    let page = format!("{}{}/{}.html", prefix, folder.name, slide_number(folder, asset));
    html! {
        a.thumb href=(page) {
            (thumb_media(asset, prefix))
            @if config.display.show_captions {
                @if let Some(caption) = &asset.caption {
                    span.thumb-caption { (caption) }
                }
            }
        }
    }
}

/// Grid face for one asset, dispatched on how it will render in the viewer.
fn thumb_media(asset: &Asset, prefix: &str) -> Markup {
    match lightbox::slide_media(asset) {
        SlideMedia::Image { source } => html! {
            img.thumb-image src={ (prefix) (href(source)) } alt=(asset.file_name) loading="lazy";
        },
        SlideMedia::Converted { output } => html! {
            img.thumb-image src={ (prefix) (href(output)) } alt=(asset.file_name) loading="lazy";
        },
        SlideMedia::Video { .. } => html! {
            div.thumb-tile.tile-video {
                span.tile-icon aria-hidden="true" { "▶" }
                span.tile-name { (asset.file_name) }
            }
        },
        SlideMedia::Converting => html! {
            div.thumb-tile.tile-pending {
                span.tile-name { (asset.file_name) }
                span.tile-note { "preparing" }
            }
        },
        SlideMedia::ConversionFailed { .. } => html! {
            div.thumb-tile.tile-failed {
                span.tile-name { (asset.file_name) }
                span.tile-note { "conversion failed" }
            }
        },
        SlideMedia::Unsupported { file_name } => html! {
            div.thumb-tile.tile-unknown {
                span.tile-name { (file_name) }
                span.tile-note { "unsupported" }
            }
        },
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the index/home page with every folder card
fn render_index(catalog: &Catalog) -> Markup {
    let tags = view::tag_universe(catalog);
    let tag_bar = if tags.len() > 1 {
        render_tag_bar(&tags, ALL_TAG, "")
    } else {
        html! {}
    };
    let heading = html! { h1 { (catalog.config.title) } };

    let content = html! {
        (site_header(heading, tag_bar))
        main.folder-list {
            @if catalog.folders.is_empty() {
                p.empty-note { "No folders yet." }
            }
            @for folder in &catalog.folders {
                @let effective: Vec<&Asset> = folder.assets.iter().collect();
                (render_folder_card(folder, &effective, &catalog.config, ""))
            }
        }
    };

    base_document(&catalog.config.title, Some("index-view"), content)
}

/// Renders a tag page: the folder list filtered through the view state with
/// this tag active. Folders with no matching assets are skipped.
fn render_tag_page(catalog: &Catalog, tag: &str) -> Markup {
    let mut view = ViewState::new(catalog);
    view.set_tag_filter(tag);

    let prefix = rel_prefix(2);
    let tags = view.tag_universe();
    let tag_bar = render_tag_bar(&tags, tag, &prefix);
    let heading = html! {
        h1 { a href={ (prefix) "index.html" } { (catalog.config.title) } }
    };

    let content = html! {
        (site_header(heading, tag_bar))
        main.folder-list {
            @for folder in &catalog.folders {
                @let effective = view.effective_assets(&folder.name);
                @if !effective.is_empty() {
                    (render_folder_card(folder, &effective, &catalog.config, &prefix))
                }
            }
        }
    };

    let title = format!("{} — {}", catalog.config.title, tag);
    base_document(&title, Some("tag-view"), content)
}

/// Renders one slide page: full-screen media with wrap navigation.
fn render_slide_page(catalog: &Catalog, folder: &Folder, index: usize) -> Markup {
    let asset = &folder.assets[index];
    let len = folder.assets.len();

    // Wrap at both ends; a single-asset folder points both arrows at itself
    let prev_url = format!("{}.html", lightbox::prev_index(index, len) + 1);
    let next_url = format!("{}.html", lightbox::next_index(index, len) + 1);
    let close_url = format!("../index.html#{}", folder.name);

    let content = html! {
        header.slide-header {
            a.slide-close href=(close_url) { "× " (folder.label) }
            span.slide-counter { (index + 1) " / " (len) }
            @if lightbox::can_download(asset.kind) {
                a.slide-download href={ "../" (href(&asset.path)) } download=(asset.file_name) {
                    "Download"
                }
            }
        }
        main.slide {
            (slide_markup(asset))
            @if catalog.config.display.show_captions {
                @if let Some(caption) = &asset.caption {
                    p.slide-caption { (caption) }
                }
            }
            @if !asset.tags.is_empty() {
                p.slide-tags {
                    @for tag in &asset.tags {
                        span.slide-tag { (tag) }
                    }
                }
            }
        }
        nav.slide-nav data-prev=(prev_url) data-next=(next_url) data-close=(close_url) {
            a.slide-prev href=(prev_url) rel="prev" { "‹" }
            a.slide-next href=(next_url) rel="next" { "›" }
        }
    };

    let title = format!("{} — {} / {}", folder.label, index + 1, len);
    base_document(&title, Some("slide-view"), content)
}

/// Viewer face for one asset. Slide pages sit one directory deep, so media
/// paths climb out with `../`.
fn slide_markup(asset: &Asset) -> Markup {
    match lightbox::slide_media(asset) {
        SlideMedia::Image { source } => html! {
            img.slide-media src={ "../" (href(source)) } alt=(asset.file_name);
        },
        SlideMedia::Converted { output } => html! {
            img.slide-media src={ "../" (href(output)) } alt=(asset.file_name);
        },
        SlideMedia::Video { source } => render_video_slot(source, &asset.file_name),
        SlideMedia::Converting => html! {
            div.slide-notice.notice-pending {
                p.notice-title { (asset.file_name) }
                p.notice-text { "This photo is still being prepared." }
            }
        },
        SlideMedia::ConversionFailed { reason } => html! {
            div.slide-notice.notice-failed {
                p.notice-title { (asset.file_name) " couldn't be converted" }
                p.notice-text { (reason) }
            }
        },
        SlideMedia::Unsupported { file_name } => html! {
            div.slide-notice.notice-unknown {
                p.notice-title { (file_name) }
                p.notice-text {
                    "This file type can't be shown in the browser. "
                    "Use the download link to save the original."
                }
            }
        },
    }
}

/// One video slot: the poster face and the player, exactly one visible.
/// `gallery.js` owns the poster/player handoff.
fn render_video_slot(source: &Path, file_name: &str) -> Markup {
    html! {
        figure.video-slot {
            button.video-poster type="button" {
                span.video-play aria-hidden="true" { "▶" }
                span.video-name { (file_name) }
            }
            button.video-close type="button" hidden { "×" }
            video.video-player controls preload="metadata" hidden {
                source src={ "../" (href(source)) } type="video/mp4";
            }
        }
    }
}

/// Convert folder description markdown to HTML
fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

// ============================================================================
// Tests
// ============================================================================
