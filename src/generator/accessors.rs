//! Typed accessor traits.
//!
//! Each assembly gets a `<Assembly>Resolver` extension trait over the
//! container so call sites write `resolver.logger()` instead of spelling out
//! `resolve::<Arc<dyn Logger>>()`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::named_groups::NamedRegistrationGroup;
use super::naming::{method_name, unique_name};
use crate::assembly::guard::common_guard;
use crate::assembly::{AccessLevel, Assembly, Registration};
use crate::diagnostics::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessorKind {
    /// `fn logger(&self) -> T`
    Single,
    /// `fn logger_named(&self, key: LoggerKey) -> T`
    Named { enum_name: String },
    /// `fn logger_collection(&self) -> Vec<T>`
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accessor {
    pub method: String,
    pub service_type: String,
    pub kind: AccessorKind,
    pub guard: Option<String>,
}

/// The accessor trait of one assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessorTrait {
    pub trait_name: String,
    pub assembly: String,
    pub access_level: AccessLevel,
    pub accessors: Vec<Accessor>,
}

/// Build the accessor trait of `assembly`
///
/// `owned_groups` are the named groups emitted next to this assembly.
/// Registrations taking runtime arguments cannot be fetched through the
/// container contract and get an `info` diagnostic instead of an accessor.
/// Returns `None` when the assembly has nothing to access.
pub fn build_accessor_trait(
    assembly: &Assembly,
    owned_groups: &[&NamedRegistrationGroup],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<AccessorTrait> {
    let mut methods = HashSet::new();
    let mut accessors = Vec::new();

    for (service_type, members) in partition(assembly, |r| r.name.is_none() && !r.into_collection) {
        if let Some(members) = without_arguments(service_type, members, diagnostics) {
            accessors.push(Accessor {
                method: unique_name(&mut methods, &method_name(service_type)),
                service_type: service_type.to_string(),
                kind: AccessorKind::Single,
                guard: common_guard(members.iter().map(|r| r.conditional_guard.as_deref())),
            });
        }
    }

    for group in owned_groups {
        let members: Vec<&Registration> = group.registrations.iter().collect();
        if without_arguments(&group.service_type, members, diagnostics).is_some() {
            accessors.push(Accessor {
                method: unique_name(&mut methods, &format!("{}_named", method_name(&group.service_type))),
                service_type: group.service_type.clone(),
                kind: AccessorKind::Named {
                    enum_name: group.enum_name.clone(),
                },
                guard: group.if_config_condition.clone(),
            });
        }
    }

    for (service_type, members) in partition(assembly, |r| r.into_collection) {
        if let Some(members) = without_arguments(service_type, members, diagnostics) {
            accessors.push(Accessor {
                method: unique_name(
                    &mut methods,
                    &format!("{}_collection", method_name(service_type)),
                ),
                service_type: service_type.to_string(),
                kind: AccessorKind::Collection,
                guard: common_guard(members.iter().map(|r| r.conditional_guard.as_deref())),
            });
        }
    }

    if accessors.is_empty() {
        return None;
    }
    Some(AccessorTrait {
        trait_name: format!("{}Resolver", assembly.name),
        assembly: assembly.name.clone(),
        access_level: assembly.access_level,
        accessors,
    })
}

/// Registrations matching `keep`, grouped by service type in first-seen order
fn partition<'a>(
    assembly: &'a Assembly,
    keep: impl Fn(&Registration) -> bool,
) -> Vec<(&'a str, Vec<&'a Registration>)> {
    let mut order: Vec<(&str, Vec<&Registration>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for registration in assembly.registrations.iter().filter(|r| keep(r)) {
        let key = registration.service_type.as_str();
        match index.get(key) {
            Some(&slot) => order[slot].1.push(registration),
            None => {
                index.insert(key, order.len());
                order.push((key, vec![registration]));
            }
        }
    }
    order
}

fn without_arguments<'a>(
    service_type: &str,
    members: Vec<&'a Registration>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Vec<&'a Registration>> {
    let Some(with_arguments) = members.iter().find(|r| !r.arguments.is_empty()) else {
        return Some(members);
    };
    diagnostics.push(
        Diagnostic::info(
            with_arguments.location.clone(),
            "argument_registration_without_accessor",
            format!(
                "`{service_type}` takes runtime arguments ({}); no accessor is generated for it",
                with_arguments.arguments.join(", ")
            ),
        )
        .with_suggestion("resolve it through the container's argument-passing API"),
    );
    None
}
