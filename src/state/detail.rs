//! Image detail view: the loaded image with its comment thread, plus the
//! comment composer.

use crate::models::{comment::Comment, image::ImageDetail};

/// State behind the detail page. Unlike the list view, a failed fetch here
/// clears the loaded image; the page shows only the error banner.
#[derive(Debug, Default)]
pub struct DetailView {
    pub image: Option<ImageDetail>,
    pub error: Option<String>,
    pub loading: bool,
    seq: u64,
    pub draft: String,
    pub submitting: bool,
}

impl DetailView {
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

    /// Apply a fetch result, dropping responses from superseded fetches.
    pub fn apply_fetch(&mut self, seq: u64, result: Result<ImageDetail, String>) {
        if seq != self.seq {
            return;
        }
        self.loading = false;
        match result {
            Ok(detail) => {
                self.image = Some(detail);
                self.error = None;
            }
            Err(message) => {
                self.image = None;
                self.error = Some(message);
            }
        }
    }

    /// Begin submitting the comment draft. Returns the content to send, or
    /// `None` when the draft is blank or a submission is already in flight.
    pub fn begin_comment(&mut self) -> Option<String> {
        if self.submitting || self.draft.trim().is_empty() {
            return None;
        }
        self.submitting = true;
        Some(self.draft.clone())
    }

    /// Apply the submission result: success clears the draft and prepends
    /// the comment (newest first); failure raises the error banner and
    /// keeps the draft for resubmission.
    pub fn apply_comment(&mut self, result: Result<Comment, String>) {
        self.submitting = false;
        match result {
            Ok(comment) => {
                self.draft.clear();
                if let Some(detail) = &mut self.image {
                    detail.comments.insert(0, comment);
                }
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::Image;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn detail() -> ImageDetail {
        ImageDetail {
            image: Image {
                id: Uuid::new_v4(),
                name: "Sunset".into(),
                description: "Evening light".into(),
                tags: Json(vec!["sunset".into()]),
                legacy_tag: None,
                url: "http://localhost:3000/media/sunset.png".into(),
                created_at: Utc::now(),
            },
            comments: vec![],
        }
    }

    fn comment(content: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            image_id: Uuid::new_v4(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn failed_fetch_clears_loaded_image() {
        let mut view = DetailView::new();
        let seq = view.begin_fetch();
        view.apply_fetch(seq, Ok(detail()));
        assert!(view.image.is_some());

        let seq = view.begin_fetch();
        view.apply_fetch(seq, Err("Failed to load image".into()));
        assert!(view.image.is_none());
        assert_eq!(view.error.as_deref(), Some("Failed to load image"));
    }

    #[test]
    fn stale_fetch_is_ignored() {
        let mut view = DetailView::new();
        let stale = view.begin_fetch();
        let fresh = view.begin_fetch();

        view.apply_fetch(fresh, Ok(detail()));
        view.apply_fetch(stale, Err("timed out".into()));

        assert!(view.image.is_some());
        assert!(view.error.is_none());
    }

    #[test]
    fn successful_comment_prepends_and_clears_draft() {
        let mut view = DetailView::new();
        let seq = view.begin_fetch();
        view.apply_fetch(seq, Ok(detail()));

        view.draft = "lovely".into();
        let content = view.begin_comment().unwrap();
        view.apply_comment(Ok(comment(&content)));

        let comments = &view.image.as_ref().unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "lovely");
        assert!(view.draft.is_empty());
        assert!(!view.submitting);
    }

    #[test]
    fn blank_draft_and_inflight_submission_do_not_submit() {
        let mut view = DetailView::new();
        view.draft = "   ".into();
        assert!(view.begin_comment().is_none());

        view.draft = "hello".into();
        assert!(view.begin_comment().is_some());
        // second call while in flight
        assert!(view.begin_comment().is_none());
    }

    #[test]
    fn failed_comment_keeps_draft() {
        let mut view = DetailView::new();
        view.draft = "hello".into();
        view.begin_comment().unwrap();
        view.apply_comment(Err("Failed to post comment".into()));

        assert_eq!(view.draft, "hello");
        assert_eq!(view.error.as_deref(), Some("Failed to post comment"));
        assert!(!view.submitting);
    }
}
