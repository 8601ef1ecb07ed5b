//! Core library: flattening, ranking, filtering and reconciling folder-as-tag bookmarks.

pub mod config;
pub mod favicon;
pub mod flatten;
pub mod models;
pub mod picker;
pub mod platform;
pub mod ranker;
pub mod reconciler;
pub mod search;
pub mod state;
pub mod undo;
