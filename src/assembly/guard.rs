//! Conditional-compilation guards.
//!
//! A guard is the text of a `cfg` predicate (`feature = "metrics"`,
//! `all(unix, not(test))`). Guards are collected while walking an assemble body
//! and combined here as plain strings; nothing in this module touches the
//! syntax tree walk itself.

use syn::{Attribute, Expr, Meta};

use super::tokens::render_stream;

/// Combine nested guards, outermost first, into a single predicate
pub fn combine(predicates: &[String]) -> Option<String> {
    match predicates {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(format!("all({})", many.join(", "))),
    }
}

/// The predicate of a `#[cfg(..)]` attribute
pub fn cfg_attribute_predicate(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("cfg") {
        return None;
    }
    match &attr.meta {
        Meta::List(list) => Some(render_stream(list.tokens.clone())),
        _ => None,
    }
}

/// All `#[cfg(..)]` predicates among `attrs`, in order
pub fn cfg_predicates(attrs: &[Attribute]) -> Vec<String> {
    attrs.iter().filter_map(cfg_attribute_predicate).collect()
}

/// The predicate of a `cfg!(..)` condition, as used in `if cfg!(..) { .. }`
pub fn cfg_macro_predicate(cond: &Expr) -> Option<String> {
    match cond {
        Expr::Macro(mac) if mac.mac.path.is_ident("cfg") => {
            Some(render_stream(mac.mac.tokens.clone()))
        }
        Expr::Paren(paren) => cfg_macro_predicate(&paren.expr),
        _ => None,
    }
}

/// Negation of a predicate, used for `else` branches
pub fn negate(predicate: &str) -> String {
    format!("not({predicate})")
}

/// Guard shared by every item, or `None` when any item is unguarded or two differ
pub fn common_guard<'a>(mut guards: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let first = guards.next()??;
    guards
        .all(|g| g == Some(first))
        .then(|| first.to_string())
}
