//! Version reporting.

/// Crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `jboxctl 0.1.0 (http://localhost)`, printed by the `version` command.
pub fn version_line(base_url: &str) -> String {
    format!("jboxctl {} ({})", VERSION, base_url)
}
