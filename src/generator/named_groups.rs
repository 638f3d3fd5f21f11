//! Named registration groups.
//!
//! Every service type registered under at least one name gets a key enum with
//! one case per name. Groups are built across all input files so a name can
//! never be claimed twice for the same type, wherever the registrations live.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use super::naming::{case_variant, type_ident, unique_name};
use crate::assembly::guard::common_guard;
use crate::assembly::{AccessLevel, Assembly, Registration};
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;

/// All named registrations of one service type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRegistrationGroup {
    pub service_type: String,
    /// Name of the generated key enum
    pub enum_name: String,
    /// Members in first-seen order; each carries a name
    pub registrations: Vec<Registration>,
    /// Least restrictive level among members, unless overridden
    pub access_level: AccessLevel,
    /// Guard hoisted from the members when they all share it
    pub if_config_condition: Option<String>,
    /// Assembly of the first member; the group is emitted next to it
    pub owner: String,
    pub owner_file: PathBuf,
}

impl NamedRegistrationGroup {
    /// Guard emitted on one member's case
    ///
    /// At most one guard layer applies: the member's own guard is used only
    /// when the group has none.
    pub fn case_guard<'a>(&'a self, member: &'a Registration) -> Option<&'a str> {
        match &self.if_config_condition {
            Some(_) => None,
            None => member.conditional_guard.as_deref(),
        }
    }

    /// `(variant, tag, case guard)` in case order
    pub fn cases(&self) -> impl Iterator<Item = (String, &str, Option<&str>)> {
        self.registrations.iter().filter_map(|member| {
            member
                .name
                .as_deref()
                .map(|tag| (case_variant(tag), tag, self.case_guard(member)))
        })
    }
}

struct Partition<'a> {
    service_type: &'a str,
    owner: &'a Assembly,
    members: Vec<&'a Registration>,
}

/// Group the named registrations of all assemblies by service type
///
/// Groups come out in first-seen order of their service type, members in
/// extraction order. A group with a duplicate name, or with two names mapping
/// to the same enum case, is reported and left out entirely.
pub fn build_named_groups<'a>(
    assemblies: impl IntoIterator<Item = &'a Assembly>,
    config: &GeneratorConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NamedRegistrationGroup> {
    let mut partitions: Vec<Partition<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for assembly in assemblies {
        for registration in &assembly.registrations {
            if registration.name.is_none() {
                continue;
            }
            let service_type = registration.service_type.as_str();
            let slot = *index.entry(service_type).or_insert_with(|| {
                partitions.push(Partition {
                    service_type,
                    owner: assembly,
                    members: Vec::new(),
                });
                partitions.len() - 1
            });
            partitions[slot].members.push(registration);
        }
    }

    for key in config.unmatched_group_keys(partitions.iter().map(|p| p.service_type)) {
        tracing::warn!(key, "group override matches no named registration");
    }

    let mut enum_names = HashSet::new();
    let mut groups = Vec::new();
    for partition in partitions {
        if !validate_partition(&partition, diagnostics) {
            tracing::warn!(service_type = partition.service_type, "dropping named group");
            continue;
        }
        groups.push(build_group(partition, config, &mut enum_names));
    }
    groups
}

fn validate_partition(partition: &Partition<'_>, diagnostics: &mut Vec<Diagnostic>) -> bool {
    let mut valid = true;
    let mut by_name: HashMap<&str, &Registration> = HashMap::new();
    let mut by_variant: HashMap<String, &Registration> = HashMap::new();
    for member in &partition.members {
        let Some(name) = member.name.as_deref() else {
            continue;
        };
        if let Some(first) = by_name.get(name) {
            diagnostics.push(
                Diagnostic::error(
                    member.location.clone(),
                    "duplicate_named_registration",
                    format!(
                        "`{}` is registered twice under the name \"{name}\"",
                        partition.service_type
                    ),
                )
                .with_related(first.location.clone())
                .with_suggestion("rename or remove one of the registrations"),
            );
            valid = false;
            continue;
        }
        by_name.insert(name, member);

        let variant = case_variant(name);
        if let Some(first) = by_variant.get(&variant) {
            diagnostics.push(
                Diagnostic::error(
                    member.location.clone(),
                    "case_name_collision",
                    format!(
                        "names \"{}\" and \"{name}\" of `{}` both become the enum case `{variant}`",
                        first.name.as_deref().unwrap_or_default(),
                        partition.service_type
                    ),
                )
                .with_related(first.location.clone())
                .with_suggestion("pick names that differ in more than case or punctuation"),
            );
            valid = false;
            continue;
        }
        by_variant.insert(variant, member);
    }
    valid
}

fn build_group(
    partition: Partition<'_>,
    config: &GeneratorConfig,
    enum_names: &mut HashSet<String>,
) -> NamedRegistrationGroup {
    let overrides = config.group_override(partition.service_type);

    let if_config_condition = common_guard(
        partition
            .members
            .iter()
            .map(|member| member.conditional_guard.as_deref()),
    );
    let registrations: Vec<Registration> = partition
        .members
        .iter()
        .map(|&member| {
            let mut member = member.clone();
            if if_config_condition.is_some() {
                member.conditional_guard = None;
            }
            member
        })
        .collect();

    let access_level = overrides
        .and_then(|o| o.access)
        .or_else(|| registrations.iter().map(|r| r.access_level).max())
        .unwrap_or_default();

    let base_name = overrides
        .and_then(|o| o.enum_name.clone())
        .unwrap_or_else(|| format!("{}Key", type_ident(partition.service_type)));
    let enum_name = unique_name(enum_names, &base_name);

    tracing::debug!(
        service_type = partition.service_type,
        enum_name = %enum_name,
        cases = registrations.len(),
        "built named group"
    );
    NamedRegistrationGroup {
        service_type: partition.service_type.to_string(),
        enum_name,
        registrations,
        access_level,
        if_config_condition,
        owner: partition.owner.name.clone(),
        owner_file: partition.owner.location.file.clone(),
    }
}
