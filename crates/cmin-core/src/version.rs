use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the JSON event trace format accepted by [`crate::Trace`].
pub const TRACE_SCHEMA_VERSION: u32 = 1;

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("cmin {VERSION}");

    if let Some(hash) = option_env!("CMIN_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}
