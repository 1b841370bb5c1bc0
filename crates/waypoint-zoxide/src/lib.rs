//! Persistent waypoint plugin serving frecent directories from zoxide.
//!
//! The plugin stays alive next to the launcher, keeps the launcher's index in
//! step with the zoxide database and handles actions on indexed directories.

pub mod actions;
pub mod config;
pub mod diff;
pub mod engine;
pub mod item;
pub mod platform;
pub mod source;
pub mod terminal;
pub mod watch;

mod error;
mod process;

pub use engine::Engine;
pub use error::{Error, Result};
