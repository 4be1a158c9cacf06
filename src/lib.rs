//! tally - file-backed list stores with tag-based cache invalidation
//!
//! Small persistence layer for app backends that keep their data in
//! human-diffable JSON blobs: an ordered todo list and chat transcripts,
//! each loaded lazily, memoized under a cache tag, and mutated only through
//! a validating gateway that rewrites the whole blob and invalidates the
//! tag.
//!
//! There is no internal locking. One mutation is expected to be in flight
//! at a time; overlapping mutations race the read-modify-write and the last
//! full rewrite wins.

pub mod cache;
pub mod chat;
pub mod config;
pub mod error;
pub mod todo;

pub use error::{TallyError, TallyResult};
