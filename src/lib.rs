// ABOUTME: Public library API for the notedown sync tool
// ABOUTME: Re-exports core modules for the binary and integration tests

pub mod api;
pub mod auth;
pub mod cli;
pub mod detect;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod storage;
pub mod summary;
pub mod sync;
pub mod transform;
pub mod util;

pub use error::{Error, Result};
pub use export::ExportBundle;
pub use model::Entry;
pub use summary::SyncSummary;
