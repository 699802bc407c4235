//! A headless component reconciliation and diffing engine.
//!
//! Screens are described as lists of [`ComponentModel`]s (lists, grids, carousels, rows and
//! composites nested inside items), usually decoded from a JSON payload. This crate keeps a set
//! of live [`Component`]s in sync with new models while touching as little of the rendered
//! surface as possible:
//!
//! - [`Changes::between`] computes a positional edit script between two item lists.
//! - [`Component`] applies mutations and edit scripts to its model and live surface, one queued
//!   operation at a time.
//! - [`Controller::reload_if_needed`] diffs whole screens, replacing components whose kind or
//!   shape changed and diffing the rest in place.
//! - [`ScrollView`] stacks components vertically in one viewport.
//!
//! It is UI-agnostic. A host toolkit is expected to provide:
//! - a [`UserInterface`] per component (insert/delete/reload index ranges, batch updates)
//! - [`ItemView`]s that configure themselves from an [`Item`] and report their size
//!
//! For state caching and scroll anchoring, see the `spots-adapter` crate.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod component;
mod composite;
mod config;
mod controller;
mod delegate;
mod diff;
mod error;
mod fenwick;
mod item;
mod layout;
mod manager;
mod model;
mod moves;
mod mutation;
mod payload;
mod registry;
mod scroll;
mod types;
mod view;


pub use component::{CacheHook, Component};
pub use composite::{COMPOSITE_KIND, CompositeComponent};
pub use config::{Configuration, SurfaceFactory};
pub use controller::Controller;
pub use delegate::ComponentDelegate;
pub use diff::{Changes, ItemDiff, evaluate};
pub use error::{Error, Result};
pub use item::{Item, items_strict_eq};
pub use layout::{
    HeaderMode, Inset, Interaction, Layout, MouseClick, PageIndicatorPlacement, Paginate,
    ScrollDirection,
};
pub use manager::generate_changes;
pub use model::{ComponentModel, ComponentModelDiff};
pub use moves::{calculate_move_for_deleted_indexes, calculate_move_for_inserted_indexes};
pub use mutation::{Completion, OperationPhase};
pub use payload::{
    DEFAULT_PAYLOAD_KEY, models_from_value, parse_payload, parse_payload_with_key, to_payload,
    to_payload_with_key,
};
pub use registry::{Registry, ViewFactory};
pub use scroll::{ScrollEdge, ScrollMotion, ScrollView};
pub use types::{Animation, ComponentId, ComponentKind, Size};
pub use view::{ComponentFrame, ItemView, Surface, SurfaceUpdate, UserInterface};
