//! Gallery list view: fetched summaries plus client-side search and tag
//! filtering.

use crate::models::image::ImageSummary;
use std::collections::BTreeSet;

/// State behind the public gallery grid (and the admin image list, which
/// renders the same data).
#[derive(Debug, Default)]
pub struct GalleryView {
    images: Vec<ImageSummary>,
    search: String,
    selected_tag: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
    seq: u64,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, returning the sequence number the response must carry
    /// back into [`apply_fetch`].
    pub fn begin_fetch(&mut self) -> u64 {
        self.seq += 1;
        self.loading = true;
        self.seq
    }

    /// Apply a fetch result. Responses from superseded fetches are dropped;
    /// a failed fetch raises the error banner but keeps already-loaded
    /// images on screen.
    pub fn apply_fetch(&mut self, seq: u64, result: Result<Vec<ImageSummary>, String>) {
        if seq != self.seq {
            return;
        }
        self.loading = false;
        match result {
            Ok(images) => {
                self.images = images;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_selected_tag(&mut self, tag: Option<String>) {
        self.selected_tag = tag;
    }

    pub fn images(&self) -> &[ImageSummary] {
        &self.images
    }

    /// Images matching the current search term (case-insensitive name
    /// substring) and selected tag (case-insensitive equality).
    pub fn visible(&self) -> Vec<&ImageSummary> {
        let search = self.search.to_lowercase();
        self.images
            .iter()
            .filter(|image| image.name.to_lowercase().contains(&search))
            .filter(|image| match &self.selected_tag {
                Some(selected) => image
                    .tags
                    .0
                    .iter()
                    .any(|tag| tag.eq_ignore_ascii_case(selected)),
                None => true,
            })
            .collect()
    }

    /// Sorted, deduplicated universe of tags across all loaded images, for
    /// the filter dropdown.
    pub fn known_tags(&self) -> Vec<String> {
        self.images
            .iter()
            .flat_map(|image| image.tags.0.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
