//! Identifier derivation for generated declarations.
//!
//! Service types arrive as canonical type text (`Arc<dyn Logger>`); generated
//! code needs identifiers derived from them (`LoggerKey`, `fn logger()`).

use std::collections::HashSet;
use syn::{GenericArgument, Path, PathArguments, Type, TypeParamBound};

/// Single-parameter smart pointers left out of derived names
const TRANSPARENT_WRAPPERS: &[&str] = &["Arc", "Rc", "Box"];

/// Convert a tag or snake_case string to CamelCase
///
/// Any non-alphanumeric character separates words; the first letter of each
/// word is upper-cased and the rest kept as written.
pub fn to_camel_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a CamelCase identifier to snake_case (`HTTPClient` → `http_client`)
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Enum variant for a registration name tag
///
/// Tags that do not start with a letter, or that would produce `Self`, are
/// prefixed with `Key`.
pub fn case_variant(tag: &str) -> String {
    let camel = to_camel_case(tag);
    let starts_with_letter = camel.chars().next().is_some_and(char::is_alphabetic);
    if !starts_with_letter || camel == "Self" {
        format!("Key{camel}")
    } else {
        camel
    }
}

/// CamelCase identifier naming a service type
///
/// Path idents are concatenated with their generic arguments; `dyn`, `impl`,
/// references and `Arc`/`Rc`/`Box` wrappers are dropped:
/// `Arc<dyn Logger>` → `Logger`, `HashMap<String, u32>` → `HashMapStringU32`.
pub fn type_ident(service_type: &str) -> String {
    let mut out = String::new();
    match syn::parse_str::<Type>(service_type) {
        Ok(ty) => push_type_ident(&ty, &mut out),
        Err(_) => out = to_camel_case(service_type),
    }
    if out.is_empty() {
        "Service".to_string()
    } else {
        out
    }
}

/// snake_case method name for a service type, never a keyword
pub fn method_name(service_type: &str) -> String {
    let name = to_snake_case(&type_ident(service_type));
    if syn::parse_str::<syn::Ident>(&name).is_ok() {
        name
    } else {
        format!("{name}_service")
    }
}

/// Return `name`, or `name_1`, `name_2`, ... when it is already taken
pub(crate) fn unique_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if seen.insert(candidate.clone()) {
            tracing::warn!(name, candidate = %candidate, "duplicate generated name");
            return candidate;
        }
        counter += 1;
    }
}

fn push_type_ident(ty: &Type, out: &mut String) {
    match ty {
        Type::Path(type_path) => push_path_ident(&type_path.path, out),
        Type::TraitObject(object) => push_bounds_ident(object.bounds.iter(), out),
        Type::ImplTrait(imp) => push_bounds_ident(imp.bounds.iter(), out),
        Type::Reference(reference) => push_type_ident(&reference.elem, out),
        Type::Paren(paren) => push_type_ident(&paren.elem, out),
        Type::Group(group) => push_type_ident(&group.elem, out),
        Type::Slice(slice) => {
            push_type_ident(&slice.elem, out);
            out.push_str("Slice");
        }
        Type::Array(array) => {
            push_type_ident(&array.elem, out);
            out.push_str("Array");
        }
        Type::Tuple(tuple) if tuple.elems.is_empty() => out.push_str("Unit"),
        Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                push_type_ident(elem, out);
            }
        }
        _ => {}
    }
}

fn push_bounds_ident<'a>(mut bounds: impl Iterator<Item = &'a TypeParamBound>, out: &mut String) {
    let first_trait = bounds.find_map(|bound| match bound {
        TypeParamBound::Trait(trait_bound) => Some(&trait_bound.path),
        _ => None,
    });
    if let Some(path) = first_trait {
        push_path_ident(path, out);
    }
}

fn push_path_ident(path: &Path, out: &mut String) {
    let Some(segment) = path.segments.last() else {
        return;
    };
    let type_args: Vec<&Type> = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let ident = segment.ident.to_string();
    let transparent = type_args.len() == 1 && TRANSPARENT_WRAPPERS.contains(&ident.as_str());
    if !transparent {
        out.push_str(&to_camel_case(&ident));
    }
    for arg in type_args {
        push_type_ident(arg, out);
    }
}
