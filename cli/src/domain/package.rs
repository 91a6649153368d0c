//! Package requirement helpers: pure functions, no I/O, no async.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::InstallError;

/// Characters allowed in a pinned version. Keeps `==` pins from smuggling
/// extra requirement syntax (`; markers`, `@ url`, spaces) into the
/// package manager command line.
pub static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern: cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9A-Za-z][0-9A-Za-z.+!_-]*$").expect("valid regex")
});

/// Validate a version string before it is pinned.
///
/// # Errors
///
/// Returns `InstallError::InvalidVersion` if the version is empty or
/// contains characters outside the allowed set.
pub fn validate_version(version: &str) -> Result<(), InstallError> {
    if VERSION_RE.is_match(version) {
        Ok(())
    } else {
        Err(InstallError::InvalidVersion(version.to_string()))
    }
}

/// Requirement string for the package manager: `name` or `name==version`.
#[must_use]
pub fn requirement(name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!("{name}=={v}"),
        None => name.to_string(),
    }
}
