//! Factory synthesis for `#[resolvable]` initializers.
//!
//! Given `Widget::new(logger: Logger, #[argument] label: String)` the generated
//! factory is
//!
//! ```text
//! impl Widget {
//!     pub(crate) fn make(resolver: &impl crate::di::Resolver, label: String) -> Self {
//!         Self::new(
//!             resolver.resolve::<Logger>().expect("no registration for `Logger`"),
//!             label,
//!         )
//!     }
//! }
//! ```
//!
//! A dependency missing at runtime panics at the first call; there is no
//! fallback value.

use serde::Serialize;
use std::collections::HashSet;

use crate::assembly::{AccessLevel, ParameterResolutionHint, ResolvableInitializer};
use crate::diagnostics::{Diagnostic, SourceLocation};

/// Name of the container handle parameter
pub const RESOLVER_PARAMETER: &str = "resolver";

/// A factory parameter forwarded to the initializer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryParameter {
    pub name: String,
    pub ty: String,
}

/// A factory ready to be emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedFactory {
    pub type_name: String,
    /// Target of the emitted `impl` block (`Cache<u32>`)
    pub self_type: String,
    pub factory_name: String,
    pub initializer: String,
    pub return_type: String,
    /// Path of the container trait taken by the resolver handle
    pub resolver_trait: String,
    /// Binding of the resolver handle; `_resolver` when nothing is resolved
    pub resolver_binding: String,
    /// `Argument` parameters only, in declaration order
    pub parameters: Vec<FactoryParameter>,
    /// One expression per initializer parameter, in declaration order
    pub call_arguments: Vec<String>,
    pub access_level: AccessLevel,
    pub guard: Option<String>,
    pub location: SourceLocation,
}

impl SynthesizedFactory {
    /// Signature without the resolver handle: `make(label: String) -> Self`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        format!("{}({}) -> {}", self.factory_name, params.join(", "), self.return_type)
    }

    /// Full parameter list as emitted, resolver handle first
    pub fn parameter_list(&self) -> String {
        let mut params = vec![format!(
            "{}: &impl {}",
            self.resolver_binding, self.resolver_trait
        )];
        params.extend(self.parameters.iter().map(|p| format!("{}: {}", p.name, p.ty)));
        params.join(", ")
    }
}

/// Build the factory for one classified initializer
///
/// The resolver handle is named `resolver`, or `resolver_` (and so on) when an
/// argument parameter already uses that name.
pub fn synthesize(initializer: &ResolvableInitializer, resolver_trait: &str) -> SynthesizedFactory {
    let taken: HashSet<&str> = initializer
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    let mut resolver = RESOLVER_PARAMETER.to_string();
    while taken.contains(resolver.as_str()) {
        resolver.push('_');
    }

    let mut parameters = Vec::new();
    let mut call_arguments = Vec::with_capacity(initializer.parameters.len());
    for parameter in &initializer.parameters {
        let argument = match &parameter.hint {
            ParameterResolutionHint::ByType => {
                let message = format!("no registration for `{}`", parameter.ty);
                format!(
                    "{resolver}.resolve::<{}>().expect({message:?})",
                    parameter.ty
                )
            }
            ParameterResolutionHint::ByName(tag) => {
                let message = format!("no registration for `{}` named \"{tag}\"", parameter.ty);
                format!(
                    "{resolver}.resolve_named::<{}>({tag:?}).expect({message:?})",
                    parameter.ty
                )
            }
            ParameterResolutionHint::Argument => {
                parameters.push(FactoryParameter {
                    name: parameter.name.clone(),
                    ty: parameter.ty.clone(),
                });
                parameter.name.clone()
            }
            ParameterResolutionHint::UseDefault(expr) => expr.clone(),
        };
        call_arguments.push(argument);
    }

    let resolves_anything = initializer.parameters.iter().any(|p| p.hint.is_resolved());
    let resolver_binding = if resolves_anything {
        resolver
    } else {
        format!("_{resolver}")
    };

    SynthesizedFactory {
        type_name: initializer.type_name.clone(),
        self_type: initializer.self_type.clone(),
        factory_name: initializer.factory_name.clone(),
        initializer: initializer.initializer.clone(),
        return_type: initializer.return_type.clone(),
        resolver_trait: resolver_trait.to_string(),
        resolver_binding,
        parameters,
        call_arguments,
        access_level: initializer.access_level,
        guard: initializer.conditional_guard.clone(),
        location: initializer.location.clone(),
    }
}

/// Synthesize every initializer, rejecting factories that would collide
///
/// A factory named like its own initializer, or a second factory with the same
/// name on the same type, is a `duplicate_factory` error and is not emitted.
pub fn synthesize_all<'a>(
    initializers: impl IntoIterator<Item = &'a ResolvableInitializer>,
    resolver_trait: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<SynthesizedFactory> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut factories = Vec::new();
    for initializer in initializers {
        if initializer.factory_name == initializer.initializer {
            diagnostics.push(
                Diagnostic::error(
                    initializer.location.clone(),
                    "duplicate_factory",
                    format!(
                        "factory `{}::{}` would shadow its own initializer",
                        initializer.type_name, initializer.factory_name
                    ),
                )
                .with_suggestion("choose another name with #[resolvable(name = \"..\")]"),
            );
            continue;
        }
        let key = (initializer.self_type.clone(), initializer.factory_name.clone());
        if !seen.insert(key) {
            diagnostics.push(
                Diagnostic::error(
                    initializer.location.clone(),
                    "duplicate_factory",
                    format!(
                        "`{}` already has a synthesized factory named `{}`",
                        initializer.self_type, initializer.factory_name
                    ),
                )
                .with_suggestion("choose another name with #[resolvable(name = \"..\")]"),
            );
            continue;
        }
        let factory = synthesize(initializer, resolver_trait);
        tracing::debug!(
            type_name = %factory.type_name,
            signature = %factory.signature(),
            "synthesized factory"
        );
        factories.push(factory);
    }
    factories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{InitializerParameter, ModuleScope};

    fn param(name: &str, ty: &str, hint: ParameterResolutionHint) -> InitializerParameter {
        InitializerParameter {
            name: name.to_string(),
            ty: ty.to_string(),
            hint,
        }
    }

    fn widget(parameters: Vec<InitializerParameter>) -> ResolvableInitializer {
        ResolvableInitializer {
            type_name: "Widget".to_string(),
            self_type: "Widget".to_string(),
            initializer: "new".to_string(),
            factory_name: "make".to_string(),
            return_type: "Self".to_string(),
            access_level: AccessLevel::Internal,
            parameters,
            conditional_guard: None,
            scope: ModuleScope::default(),
            location: SourceLocation::new("widget.rs", 4, 5),
        }
    }

    #[test]
    fn test_single_argument_is_the_only_parameter() {
        let factory = synthesize(
            &widget(vec![
                param("logger", "Logger", ParameterResolutionHint::ByType),
                param("label", "String", ParameterResolutionHint::Argument),
            ]),
            "crate::di::Resolver",
        );
        assert_eq!(factory.signature(), "make(label: String) -> Self");
        assert_eq!(
            factory.call_arguments,
            vec![
                "resolver.resolve::<Logger>().expect(\"no registration for `Logger`\")".to_string(),
                "label".to_string(),
            ]
        );
        assert_eq!(
            factory.parameter_list(),
            "resolver: &impl crate::di::Resolver, label: String"
        );
    }

    #[test]
    fn test_all_by_type_takes_no_parameters() {
        let factory = synthesize(
            &widget(vec![
                param("logger", "Arc<dyn Logger>", ParameterResolutionHint::ByType),
                param("db", "Database", ParameterResolutionHint::ByType),
            ]),
            "crate::di::Resolver",
        );
        assert!(factory.parameters.is_empty());
        assert_eq!(factory.signature(), "make() -> Self");
        assert!(factory
            .call_arguments
            .iter()
            .all(|arg| arg.starts_with("resolver.resolve::<")));
    }

    #[test]
    fn test_named_and_default_parameters() {
        let factory = synthesize(
            &widget(vec![
                param("db", "Database", ParameterResolutionHint::ByName("primary".into())),
                param(
                    "timeout",
                    "Duration",
                    ParameterResolutionHint::UseDefault("Duration::from_secs(5)".into()),
                ),
            ]),
            "di::Container",
        );
        assert_eq!(
            factory.call_arguments,
            vec![
                "resolver.resolve_named::<Database>(\"primary\").expect(\"no registration for `Database` named \\\"primary\\\"\")"
                    .to_string(),
                "Duration::from_secs(5)".to_string(),
            ]
        );
    }

    #[test]
    fn test_unused_resolver_is_underscored() {
        let factory = synthesize(
            &widget(vec![param("label", "String", ParameterResolutionHint::Argument)]),
            "crate::di::Resolver",
        );
        assert_eq!(factory.resolver_binding, "_resolver");
    }

    #[test]
    fn test_resolver_name_avoids_argument_names() {
        let factory = synthesize(
            &widget(vec![
                param("resolver", "String", ParameterResolutionHint::Argument),
                param("logger", "Logger", ParameterResolutionHint::ByType),
            ]),
            "crate::di::Resolver",
        );
        assert_eq!(factory.resolver_binding, "resolver_");
        assert!(factory.call_arguments[1].starts_with("resolver_.resolve::<Logger>()"));
    }

    #[test]
    fn test_duplicate_factories_are_rejected() {
        let first = widget(vec![]);
        let second = widget(vec![]);
        let mut shadowing = widget(vec![]);
        shadowing.factory_name = "new".to_string();
        let mut diagnostics = Vec::new();
        let factories = synthesize_all([&first, &second, &shadowing], "crate::di::Resolver", &mut diagnostics);
        assert_eq!(factories.len(), 1);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.kind == "duplicate_factory"));
    }

    #[test]
    fn test_factories_on_distinct_instantiations_do_not_collide() {
        let mut narrow = widget(vec![]);
        narrow.self_type = "Widget<u32>".to_string();
        let mut wide = widget(vec![]);
        wide.self_type = "Widget<u64>".to_string();
        let mut diagnostics = Vec::new();
        let factories = synthesize_all([&narrow, &wide], "crate::di::Resolver", &mut diagnostics);
        assert!(diagnostics.is_empty());
        let targets: Vec<_> = factories.iter().map(|f| f.self_type.as_str()).collect();
        assert_eq!(targets, vec!["Widget<u32>", "Widget<u64>"]);
    }
}
