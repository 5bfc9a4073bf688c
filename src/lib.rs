//! Pokedex TUI - paginated, searchable PokeAPI browser on tui-dispatch
//!
//! The library exposes every module so the binary and the integration tests
//! share one reducer, catalog client and selection handoff.

pub mod action;
pub mod api;
pub mod config;
pub mod detail;
pub mod effect;
pub mod handoff;
pub mod logging;
pub mod reducer;
pub mod sprite;
pub mod state;
pub mod ui;
