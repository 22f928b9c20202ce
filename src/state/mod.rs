//! View-state controllers for the gallery clients.
//!
//! These hold the local UI state a browser view keeps between fetches:
//! loaded data, search/filter inputs, an inline error banner, and a fetch
//! sequence number so a late response can never overwrite fresher state.
//! They are plain data types with no I/O; the transport feeds results in.

// No server route calls into these; they model the browser-side views and
// are exercised by their unit tests.
#[allow(dead_code)]
pub mod detail;
#[allow(dead_code)]
pub mod gallery;
