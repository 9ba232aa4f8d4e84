//! Core system components shared by every behaviour
pub mod cancel;
pub mod config;
pub mod error;
pub mod io;
pub(crate) mod poll;
pub mod resources;
pub mod state;
