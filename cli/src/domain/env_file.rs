//! Environment artifact rendering: pure functions, no I/O, no async.
//!
//! Returns the file content as a `String`; the caller is responsible for
//! writing it to disk.

use std::fmt::Write as _;
use std::path::Path;

use crate::domain::settings::ResolvedSettings;

/// Name of the generated environment file inside the runtime prefix.
pub const ENV_FILE_NAME: &str = ".env";

/// Map a setting key to its environment variable name:
/// `base-api-url` with prefix `CLUSTER_AGENT_` → `CLUSTER_AGENT_BASE_API_URL`.
#[must_use]
pub fn env_key(prefix: &str, key: &str) -> String {
    format!("{prefix}{}", key.replace('-', "_").to_uppercase())
}

/// Render the environment artifact.
///
/// Line order: the optional verbatim `header`, one `KEY=value` line per
/// setting, then the cache-directory line, which is always last. Values are
/// written unquoted in their plain string form.
#[must_use]
pub fn render(
    settings: &ResolvedSettings,
    prefix: &str,
    header: Option<&str>,
    cache_dir: &Path,
) -> String {
    let mut out = String::new();
    if let Some(header) = header {
        out.push_str(header);
        if !header.ends_with('\n') {
            out.push('\n');
        }
    }
    for (key, value) in settings.iter() {
        let _ = writeln!(out, "{}={value}", env_key(prefix, key));
    }
    let _ = writeln!(out, "{}={}", env_key(prefix, "cache-dir"), cache_dir.display());
    out
}
