//! Gallery view state: expanded folders, tag filter, lightbox pointer.
//!
//! One [`ViewState`] owns all transient UI state for a gallery over a
//! read-only [`Catalog`]. It starts empty, changes only through the named
//! operations here, and is dropped with its owner — nothing in it is ever
//! persisted.
//!
//! The filtered ("effective") asset list of a folder is computed on read,
//! never cached: with the filter set to a tag, a folder's effective list is
//! the order-preserving subsequence of its assets carrying that tag; the
//! `"all"` sentinel keeps everything. The lightbox pointer indexes into the
//! *effective* list of its folder, so any operation that can shrink that
//! list re-validates the pointer and closes the lightbox rather than leave
//! it dangling.
//!
//! Opening the lightbox validates the requested index; out-of-range opens
//! are a no-op. Closing always succeeds.

use crate::types::{Asset, Catalog, Folder};
use std::collections::BTreeSet;

/// Tag filter value meaning "no filtering".
pub const ALL_TAG: &str = "all";

/// Position of the asset currently open in the lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxAt {
    /// Folder name the lightbox is showing.
    pub folder: String,
    /// Index into the *effective* (filtered) list of `folder`, not the raw
    /// asset list.
    pub index: usize,
}

/// Ephemeral UI state for one gallery view.
#[derive(Debug, Clone)]
pub struct ViewState<'a> {
    catalog: &'a Catalog,
    expanded: BTreeSet<String>,
    tag_filter: String,
    lightbox: Option<LightboxAt>,
}

impl<'a> ViewState<'a> {
    /// Fresh state: nothing expanded, filter `"all"`, lightbox closed.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            expanded: BTreeSet::new(),
            tag_filter: ALL_TAG.to_string(),
            lightbox: None,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Flip a folder's expanded membership. Each call toggles.
    pub fn toggle_folder(&mut self, name: &str) {
        if !self.expanded.remove(name) {
            self.expanded.insert(name.to_string());
        }
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }

    pub fn tag_filter(&self) -> &str {
        &self.tag_filter
    }

    /// Replace the active tag filter.
    ///
    /// Effective lists are derived on read, so there is nothing to refresh
    /// except the lightbox pointer: if the open folder's effective list is
    /// now shorter than `index + 1`, the lightbox closes.
    pub fn set_tag_filter(&mut self, tag: &str) {
        self.tag_filter = tag.to_string();
        let stale = self
            .lightbox
            .as_ref()
            .is_some_and(|at| at.index >= self.effective_assets(&at.folder).len());
        if stale {
            self.lightbox = None;
        }
    }

    /// The folder's asset list under the current filter, order preserved.
    /// An unrecognized folder name yields an empty list.
    pub fn effective_assets(&self, folder_name: &str) -> Vec<&'a Asset> {
        self.catalog
            .folder(folder_name)
            .map(|folder| filter_assets(folder, &self.tag_filter))
            .unwrap_or_default()
    }

    /// Open the lightbox at `index` into the folder's effective list.
    ///
    /// Out-of-range indexes are a no-op: whatever the lightbox state was
    /// before the call, it stays.
    pub fn open_lightbox(&mut self, folder_name: &str, index: usize) {
        if index < self.effective_assets(folder_name).len() {
            self.lightbox = Some(LightboxAt {
                folder: folder_name.to_string(),
                index,
            });
        }
    }

    /// Clear the lightbox unconditionally. Always succeeds.
    pub fn close_lightbox(&mut self) {
        self.lightbox = None;
    }

    pub fn lightbox(&self) -> Option<&LightboxAt> {
        self.lightbox.as_ref()
    }

    /// The asset the lightbox currently points at, if open.
    pub fn lightbox_asset(&self) -> Option<&'a Asset> {
        let at = self.lightbox.as_ref()?;
        self.effective_assets(&at.folder).get(at.index).copied()
    }

    /// Selectable tags for this catalog; see [`tag_universe`].
    pub fn tag_universe(&self) -> Vec<String> {
        tag_universe(self.catalog)
    }
}

/// The subsequence of `folder.assets` matching `tag`, original order
/// preserved. `"all"` keeps everything. Logos are not in `assets`, so they
/// never appear here.
pub fn filter_assets<'a>(folder: &'a Folder, tag: &str) -> Vec<&'a Asset> {
    folder
        .assets
        .iter()
        .filter(|a| tag == ALL_TAG || a.tags.iter().any(|t| t == tag))
        .collect()
}

/// Every selectable tag: the `"all"` sentinel first, then the deduplicated
/// union of asset tags across all folders, sorted for stable output.
///
/// Logo tags are not collected — logos are outside every effective list, so
/// a filter only they match would always come up empty.
pub fn tag_universe(catalog: &Catalog) -> Vec<String> {
    let mut tags: BTreeSet<&str> = BTreeSet::new();
    for folder in &catalog.folders {
        for asset in &folder.assets {
            for tag in &asset.tags {
                tags.insert(tag);
            }
        }
    }
    std::iter::once(ALL_TAG.to_string())
        .chain(
            tags.into_iter()
                .filter(|t| *t != ALL_TAG)
                .map(String::from),
        )
        .collect()
}
