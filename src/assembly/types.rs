use super::guard;
use crate::diagnostics::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Visibility of generated declarations.
///
/// Ordered from most to least restrictive, so `max()` over a set of levels
/// yields the level that satisfies all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// `pub(crate)`
    #[default]
    Internal,
    /// `pub`
    Public,
}

impl AccessLevel {
    /// Visibility keyword used in generated Rust code
    pub fn keyword(&self) -> &'static str {
        match self {
            AccessLevel::Internal => "pub(crate)",
            AccessLevel::Public => "pub",
        }
    }

    /// Access level implied by a declared visibility.
    ///
    /// Only a bare `pub` counts as public; `pub(crate)`, `pub(super)` and
    /// private items are internal.
    pub fn from_visibility(vis: &syn::Visibility) -> Self {
        match vis {
            syn::Visibility::Public(_) => AccessLevel::Public,
            _ => AccessLevel::Internal,
        }
    }
}

/// Whether an item with this visibility can be named from anywhere in the crate
///
/// True for `pub`, `pub(crate)` and `pub(in crate)`.
pub fn is_crate_visible(vis: &syn::Visibility) -> bool {
    match vis {
        syn::Visibility::Public(_) => true,
        syn::Visibility::Restricted(restricted) => restricted.path.is_ident("crate"),
        syn::Visibility::Inherited => false,
    }
}

/// Inline `mod` blocks enclosing a declaration inside its file
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleScope {
    /// Module names from the file's root inward; empty at the root
    pub segments: Vec<String>,
    /// `cfg` predicates of the enclosing modules, outermost first
    pub guards: Vec<String>,
    /// First enclosing module that is not visible crate-wide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_module: Option<String>,
}

impl ModuleScope {
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Scope of the items inside `module`
    pub fn enter(&self, module: &syn::ItemMod) -> Self {
        let name = module.ident.to_string();
        let mut scope = self.clone();
        scope.guards.extend(guard::cfg_predicates(&module.attrs));
        if scope.private_module.is_none() && !is_crate_visible(&module.vis) {
            scope.private_module = Some(name.clone());
        }
        scope.segments.push(name);
        scope
    }

    /// Path of the innermost module, relative to the file's module path
    pub fn path_from(&self, module_path: &str) -> String {
        let mut path = module_path.to_string();
        for segment in &self.segments {
            path.push_str("::");
            path.push_str(segment);
        }
        path
    }

    /// Combined `cfg` predicate of the enclosing modules
    pub fn guard(&self) -> Option<String> {
        guard::combine(&self.guards)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Internal => write!(f, "internal"),
            AccessLevel::Public => write!(f, "public"),
        }
    }
}

/// One registration statement discovered inside an assemble function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Registered type, in canonical text form (e.g. `Arc<dyn Logger>`)
    pub service_type: String,
    /// Path of the factory function when one was passed by name
    pub factory_name: Option<String>,
    /// Visibility of the declaring assembly
    pub access_level: AccessLevel,
    /// Name tag for keyed lookups; `None` is the default registration
    pub name: Option<String>,
    /// Runtime-supplied argument types, in order
    pub arguments: Vec<String>,
    /// Whether the registration joins the collection for its service type
    pub into_collection: bool,
    /// `cfg` predicate under which the registration exists
    pub conditional_guard: Option<String>,
    /// Method name of the registration call
    pub method: String,
    pub location: SourceLocation,
}

/// An assembly: a type whose assemble function declares registrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assembly {
    /// Self type of the `impl` block holding the assemble function
    pub name: String,
    pub access_level: AccessLevel,
    /// Registrations in source order
    pub registrations: Vec<Registration>,
    /// Inline modules around the `impl` block
    pub scope: ModuleScope,
    pub location: SourceLocation,
}

/// Per-parameter resolution strategy of a resolvable initializer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterResolutionHint {
    /// Resolve the declared type with no name
    ByType,
    /// Resolve the declared type under an explicit name
    ByName(String),
    /// Forwarded from the synthesized factory's own parameters
    Argument,
    /// Substitute a fixed expression
    UseDefault(String),
}

impl ParameterResolutionHint {
    /// Whether the parameter is fetched from the container
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            ParameterResolutionHint::ByType | ParameterResolutionHint::ByName(_)
        )
    }
}

/// A classified initializer parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitializerParameter {
    pub name: String,
    /// Declared type, in canonical text form
    pub ty: String,
    pub hint: ParameterResolutionHint,
}

/// A `#[resolvable]` associated function and its classified parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvableInitializer {
    /// Identifier of the `impl` block's self type (`Cache` for `impl Cache<u32>`)
    pub type_name: String,
    /// Full self type of the `impl` block, generic arguments included
    pub self_type: String,
    /// Name of the annotated function (e.g. `new`)
    pub initializer: String,
    /// Name of the factory to synthesize
    pub factory_name: String,
    /// Declared return type, reused verbatim by the factory (usually `Self`)
    pub return_type: String,
    pub access_level: AccessLevel,
    pub parameters: Vec<InitializerParameter>,
    pub conditional_guard: Option<String>,
    /// Inline modules around the `impl` block
    pub scope: ModuleScope,
    pub location: SourceLocation,
}

/// Everything extracted from one input file
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Module path of the file inside its crate (`crate::app`), when it lies under `src/`
    pub module_path: Option<String>,
    /// `use` items of the file, rendered in source order
    pub imports: Vec<String>,
    pub assemblies: Vec<Assembly>,
    pub initializers: Vec<ResolvableInitializer>,
}

impl SourceUnit {
    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty() && self.initializers.is_empty()
    }

    /// All registrations of all assemblies in the file, in source order
    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.assemblies.iter().flat_map(|a| a.registrations.iter())
    }
}
