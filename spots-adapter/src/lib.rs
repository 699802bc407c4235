//! Adapter utilities for the `spots` crate.
//!
//! The `spots` crate is UI-agnostic and focuses on diffing and reconciliation. This crate
//! provides small, framework-neutral helpers commonly needed by hosts:
//!
//! - Persisted screen state ([`StateCache`] over a [`BlobStore`], and [`CachedController`])
//! - Scroll anchoring across reconciliation (e.g. a component inserted above the viewport)
//! - A recording [`HeadlessSurface`] for hosts without a native list view, and for tests
//!
//! This crate is intentionally framework-agnostic (no toolkit bindings).
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod anchor;
mod cache;
mod controller;
mod error;
mod headless;
mod store;

#[cfg(test)]
mod tests;

pub use anchor::{AnchorKey, ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use cache::{DEFAULT_EXPIRY, StateCache, cache_file_name, component_cache_hook};
pub use controller::CachedController;
pub use error::{CacheError, Result};
pub use headless::{
    HeadlessSurface, HeadlessView, SurfaceEvent, SurfaceLog, headless_surface_factory,
};
pub use store::{BlobStore, FileStore, MemoryStore};
