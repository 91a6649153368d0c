//! Supervisor unit templates and their rendering.
//!
//! The bundled templates are compiled into the binary with `include_dir!`,
//! so this module performs no runtime I/O.

use std::collections::BTreeMap;

use agentctl_common::{RawSettings, UnitSpec};
use include_dir::{Dir, include_dir};

use crate::domain::error::TemplateError;

/// Unit templates shipped with agentctl.
static BUNDLED_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Placeholder context passed to `render_template`.
pub type RenderContext = BTreeMap<String, String>;

/// Return a bundled template by file name.
#[must_use]
pub fn bundled_template(name: &str) -> Option<&'static str> {
    BUNDLED_TEMPLATES
        .get_file(name)
        .and_then(|f| f.contents_utf8())
}

/// Substitute every `{{ name }}` placeholder from `ctx`.
///
/// Whitespace inside the braces is optional. A placeholder without a value is
/// an error rather than being rendered empty.
///
/// # Errors
///
/// Returns `TemplateError` if a placeholder is unterminated or has no value.
pub fn render_template(template: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or(TemplateError::Unterminated(offset + start))?;
        let name = after[..end].trim();
        let value = ctx
            .get(name)
            .ok_or_else(|| TemplateError::Unresolved(name.to_string()))?;
        out.push_str(value);
        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Add the unit's setting-backed variables to a base context.
///
/// Unset settings fall back to the variable's declared default.
#[must_use]
pub fn unit_context(base: &RenderContext, unit: &UnitSpec, raw: &RawSettings) -> RenderContext {
    let mut ctx = base.clone();
    for var in unit.context {
        let value = raw
            .get(var.setting)
            .and_then(Option::as_ref)
            .map_or_else(|| var.default.to_string(), ToString::to_string);
        ctx.insert(var.name.to_string(), value);
    }
    ctx
}
