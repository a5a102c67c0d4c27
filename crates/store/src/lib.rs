//! Durable state for AutoBot conversations.
//!
//! The only persistence the assistant needs is a single JSON value per
//! well-known key, so the seam is a minimal async key-value trait
//! ([`StateStore`]) with an in-memory implementation for tests and a
//! JSON-file implementation for real sessions. [`TranscriptStore`] builds
//! the capped, durable message log on top of it.

pub mod state;
pub mod transcript;

pub use state::{InMemoryStateStore, JsonFileStateStore, StateStore, StoreError};
pub use transcript::{TranscriptStore, TRANSCRIPT_KEY};
