//! Namespace rewrite of a copied theme's plugin descriptor.
//!
//! The descriptor is source text that declares the theme's namespace, e.g.
//! `namespace BcFront;`. A copy must declare its own name. The rewrite is
//! purely textual: exactly one declaration is replaced and every other
//! byte is left alone.

use regex::Regex;

use crate::error::{BcError, Result};

/// Replace the `namespace <old>;` declaration in `source` with `new`.
///
/// Only a declaration at the start of a line counts, and only the first one
/// is rewritten. Fails when `source` declares no `old` namespace.
pub fn rewrite_namespace(source: &str, old: &str, new: &str) -> Result<String> {
    let pattern = format!(r"(?m)^([ \t]*namespace[ \t]+){}([ \t]*;)", regex::escape(old));
    let re = Regex::new(&pattern)
        .map_err(|err| BcError::ValidationFailed(format!("namespace pattern: {err}")))?;

    let Some(caps) = re.captures(source) else {
        return Err(BcError::ValidationFailed(format!(
            "descriptor does not declare namespace {old}"
        )));
    };

    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps.get(2).map_or("", |m| m.as_str());

    let mut out = String::with_capacity(source.len() + new.len());
    out.push_str(&source[..whole.start]);
    out.push_str(prefix);
    out.push_str(new);
    out.push_str(suffix);
    out.push_str(&source[whole.end..]);
    Ok(out)
}

/// Whether `source` declares namespace `name`.
#[must_use]
pub fn declares_namespace(source: &str, name: &str) -> bool {
    let pattern = format!(r"(?m)^[ \t]*namespace[ \t]+{}[ \t]*;", regex::escape(name));
    Regex::new(&pattern).is_ok_and(|re| re.is_match(source))
}
