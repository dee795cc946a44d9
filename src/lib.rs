//! jboxctl - admin console client for a JuliaBox deployment.
//!
//! The library carries everything the console does short of drawing:
//! the command channel with its busy indicator, session keep-alive and
//! logout, the feature plugins and the response renderers. The `jboxctl`
//! binary puts a terminal surface in front of it.

pub mod activity;
pub mod adapters;
pub mod channel;
pub mod cli;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod picker;
pub mod plugins;
pub mod render;
pub mod session;
pub mod traits;
