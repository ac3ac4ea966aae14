//! EventSource trait and implementations.
//!
//! This crate provides the boundary between a calendar and the storage it
//! reads events from:
//!
//! - [`EventSource`] - The trait every event store implements
//! - [`MemorySource`] - A vector-backed source
//! - [`ErrorSource`] - A source that always fails
//! - [`SourceError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │  Database, API, │    │  Vec<Event>     │
//! │  file, ...      │    │                 │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │ your source     │    │ MemorySource    │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          │     EventSource      │
//!          └──────────┬───────────┘
//!                     │ get(&Filters)
//!                     ▼
//!              ┌─────────────┐
//!              │ Vec<Event>  │
//!              └─────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod source;

pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use memory::MemorySource;
pub use source::{ErrorSource, EventSource};
