//! Generator configuration loaded from `assemblygen.toml`
//!
//! Every key is optional; a missing file means the defaults below.
//!
//! ```toml
//! assemble_function = "assemble"
//! default_access = "internal"
//! resolver_trait = "crate::di::Resolver"
//! factory_name = "make"
//!
//! [[registration_methods]]
//! method = "register"
//!
//! [groups."Arc<dyn Logger>"]
//! access = "public"
//! enum_name = "LoggerName"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::assembly::tokens::canonical_type;
use crate::assembly::{default_registration_methods, AccessLevel, RegistrationMethod, RegistrationVocabulary};

/// File name looked up in the working directory when `--config` is not given
pub const CONFIG_FILE_NAME: &str = "assemblygen.toml";

/// Overrides for the named group of one service type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOverride {
    /// Force the group's access level instead of deriving it from its members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessLevel>,
    /// Use this enum name instead of the derived `<Type>Key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the function whose body declares registrations
    pub assemble_function: String,
    /// Access level of assemblies whose type declaration is not in the same file
    pub default_access: AccessLevel,
    /// Path of the container trait generated code resolves through
    pub resolver_trait: String,
    /// Default name of synthesized factories
    pub factory_name: String,
    /// Recognized registration methods; empty means the built-in vocabulary
    pub registration_methods: Vec<RegistrationMethod>,
    /// Per service type overrides, keyed by canonical type text
    pub groups: BTreeMap<String, GroupOverride>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            assemble_function: "assemble".to_string(),
            default_access: AccessLevel::Internal,
            resolver_trait: "crate::di::Resolver".to_string(),
            factory_name: "make".to_string(),
            registration_methods: Vec::new(),
            groups: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn vocabulary(&self) -> RegistrationVocabulary {
        if self.registration_methods.is_empty() {
            RegistrationVocabulary::new(default_registration_methods())
        } else {
            RegistrationVocabulary::new(self.registration_methods.iter().cloned())
        }
    }

    /// Override for the group of `service_type`, which is in canonical form.
    ///
    /// Keys are compared after canonicalization, so `"Arc<dyn Logger >"`
    /// matches `Arc<dyn Logger>`.
    pub fn group_override(&self, service_type: &str) -> Option<&GroupOverride> {
        self.groups.get(service_type).or_else(|| {
            self.groups
                .iter()
                .find(|(key, _)| group_key_matches(key, service_type))
                .map(|(_, group)| group)
        })
    }

    /// Override keys that match none of `service_types`
    pub fn unmatched_group_keys<'a, 'b>(
        &'a self,
        service_types: impl IntoIterator<Item = &'b str> + Clone,
    ) -> Vec<&'a str> {
        self.groups
            .keys()
            .filter(|key| {
                !service_types
                    .clone()
                    .into_iter()
                    .any(|service_type| group_key_matches(key, service_type))
            })
            .map(String::as_str)
            .collect()
    }
}

fn group_key_matches(key: &str, service_type: &str) -> bool {
    key == service_type || canonical_type(key).as_deref() == Some(service_type)
}

/// Load the configuration file
///
/// Returns `Ok(None)` if the file does not exist and `Err` if it exists but
/// cannot be read or parsed.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Resolve the config file path
///
/// Priority:
/// 1. Explicitly provided path (via CLI); it must exist
/// 2. `assemblygen.toml` in `search_dir`
/// 3. None (built-in defaults)
pub fn resolve_config_path(
    explicit_path: Option<&Path>,
    search_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let candidate = search_dir.join(CONFIG_FILE_NAME);
    Ok(candidate.exists().then_some(candidate))
}

/// Load the configuration the CLI should use, falling back to defaults
pub fn load_effective_config(
    explicit_path: Option<&Path>,
    search_dir: &Path,
) -> anyhow::Result<GeneratorConfig> {
    match resolve_config_path(explicit_path, search_dir)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading generator config");
            Ok(load_config(&path)?.unwrap_or_default())
        }
        None => Ok(GeneratorConfig::default()),
    }
}
