//! Lantern — a privacy-focused minimal browser core.
//!
//! The heart of the crate is the reactive tab engine: a [`tabs::TabRegistry`]
//! owning the live tab sessions, and a [`browser::Synchronizer`] that folds
//! each foreground tab's signal channels into a single immutable
//! [`types::view_state::ViewState`] snapshot and routes user actions into the
//! registry and the persistent stores.

pub mod browser;
pub mod database;
pub mod repositories;
pub mod services;
pub mod tabs;
pub mod types;
