//! Resolvable initializer extraction.
//!
//! Finds associated functions annotated with `#[resolvable]` and classifies each
//! parameter by its resolution hint:
//!
//! ```text
//! impl Widget {
//!     #[resolvable]
//!     pub fn new(
//!         logger: Arc<dyn Logger>,                          // ByType
//!         #[named("primary")] db: Database,                 // ByName("primary")
//!         #[argument] label: String,                        // Argument
//!         #[use_default(Duration::from_secs(5))] timeout: Duration, // UseDefault
//!     ) -> Self { .. }
//! }
//! ```
//!
//! A parameter that cannot be expressed with a hint, or that carries more than
//! one, is an error for its initializer only. Other initializers in the same
//! file are still extracted.

use std::path::Path;

use syn::spanned::Spanned;
use syn::{Attribute, Expr, FnArg, ImplItem, ImplItemFn, ItemImpl, Lit, Meta, Pat, PatType, ReturnType, Type};

use super::extract::{collect_scoped_impls, self_type_name, unreachable_module, ScopedImpl};
use super::guard;
use super::tokens::render;
use super::types::{
    is_crate_visible, AccessLevel, InitializerParameter, ModuleScope, ParameterResolutionHint,
    ResolvableInitializer,
};
use crate::diagnostics::{Diagnostic, SourceLocation};

/// Attribute marking an initializer for factory synthesis
pub const RESOLVABLE_ATTRIBUTE: &str = "resolvable";

const HINT_ARGUMENT: &str = "argument";
const HINT_NAMED: &str = "named";
const HINT_USE_DEFAULT: &str = "use_default";

/// Extract every `#[resolvable]` initializer in `file`
///
/// Initializers with invalid parameters are left out; one error diagnostic is
/// pushed per offending parameter.
pub fn extract_initializers(
    file: &syn::File,
    path: &Path,
    default_factory_name: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ResolvableInitializer> {
    let mut impls = Vec::new();
    collect_scoped_impls(&file.items, &ModuleScope::default(), &mut impls);

    let mut initializers = Vec::new();
    for ScopedImpl { item: item_impl, scope } in impls {
        if item_impl.trait_.is_some() {
            continue;
        }
        let Some(type_name) = self_type_name(&item_impl.self_ty) else {
            continue;
        };
        for impl_item in &item_impl.items {
            let ImplItem::Fn(func) = impl_item else {
                continue;
            };
            let Some(attr) = func.attrs.iter().find(|a| is_resolvable_attribute(a)) else {
                continue;
            };
            let declaration = InitializerDeclaration {
                item_impl,
                func,
                attr,
                scope: &scope,
            };
            match classify_initializer(declaration, &type_name, path, default_factory_name) {
                Ok(initializer) => {
                    tracing::debug!(
                        type_name = %initializer.type_name,
                        initializer = %initializer.initializer,
                        "found resolvable initializer"
                    );
                    initializers.push(initializer);
                }
                Err(errors) => {
                    tracing::warn!(
                        type_name = %type_name,
                        initializer = %func.sig.ident,
                        errors = errors.len(),
                        "skipping resolvable initializer"
                    );
                    diagnostics.extend(errors);
                }
            }
        }
    }
    initializers
}

/// `#[resolvable]` or a path ending in it (`#[assemblygen_macros::resolvable]`)
fn is_resolvable_attribute(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == RESOLVABLE_ATTRIBUTE)
}

/// Syntax around one `#[resolvable]` function
#[derive(Clone, Copy)]
struct InitializerDeclaration<'a> {
    item_impl: &'a ItemImpl,
    func: &'a ImplItemFn,
    attr: &'a Attribute,
    scope: &'a ModuleScope,
}

fn classify_initializer(
    declaration: InitializerDeclaration<'_>,
    type_name: &str,
    path: &Path,
    default_factory_name: &str,
) -> Result<ResolvableInitializer, Vec<Diagnostic>> {
    let InitializerDeclaration {
        item_impl,
        func,
        attr,
        scope,
    } = declaration;
    let location = SourceLocation::from_span(path, func.sig.ident.span());
    let mut errors = Vec::new();

    let factory_name = match factory_name_override(attr) {
        Ok(name) => name.unwrap_or_else(|| default_factory_name.to_string()),
        Err(message) => {
            errors.push(Diagnostic::error(
                SourceLocation::from_span(path, attr.span()),
                "invalid_hint",
                message,
            ));
            default_factory_name.to_string()
        }
    };

    let unsupported_initializer = |message: String| {
        Diagnostic::error(location.clone(), "unsupported_initializer", message)
    };
    if let Some(module) = &scope.private_module {
        errors.push(unreachable_module(
            location.clone(),
            &format!("{type_name}::{}", func.sig.ident),
            module,
        ));
    }
    if !is_crate_visible(&func.vis) {
        errors.push(
            unsupported_initializer(format!(
                "`{type_name}::{}` is not visible to generated code",
                func.sig.ident
            ))
            .with_suggestion("declare it `pub(crate)` or `pub`"),
        );
    }
    if func.sig.asyncness.is_some() {
        errors.push(unsupported_initializer(format!(
            "`{type_name}::{}` is async; factories are synchronous",
            func.sig.ident
        )));
    }
    if !item_impl.generics.params.is_empty() {
        errors.push(unsupported_initializer(format!(
            "`{type_name}` has a generic impl block; factories are emitted for concrete types only"
        )));
    }
    if !func.sig.generics.params.is_empty() {
        errors.push(unsupported_initializer(format!(
            "`{type_name}::{}` is generic; factories need concrete parameter types",
            func.sig.ident
        )));
    }
    let return_type = match &func.sig.output {
        ReturnType::Type(_, ty) => render(ty.as_ref()),
        ReturnType::Default => {
            errors.push(unsupported_initializer(format!(
                "`{type_name}::{}` returns nothing to build",
                func.sig.ident
            )));
            String::new()
        }
    };
    if let Some(variadic) = &func.sig.variadic {
        errors.push(Diagnostic::error(
            SourceLocation::from_span(path, variadic.span()),
            "unsupported_parameter",
            "variadic parameters cannot be resolved or forwarded",
        ));
    }

    let mut parameters = Vec::new();
    for input in &func.sig.inputs {
        match input {
            FnArg::Receiver(receiver) => errors.push(Diagnostic::error(
                SourceLocation::from_span(path, receiver.span()),
                "unsupported_parameter",
                format!(
                    "`{type_name}::{}` takes `self`; only associated functions can be resolvable",
                    func.sig.ident
                ),
            )),
            FnArg::Typed(pat_type) => match classify_parameter(pat_type, path) {
                Ok(parameter) => parameters.push(parameter),
                Err(diagnostic) => errors.push(diagnostic),
            },
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut guards = scope.guards.clone();
    guards.extend(guard::cfg_predicates(&item_impl.attrs));
    guards.extend(guard::cfg_predicates(&func.attrs));

    Ok(ResolvableInitializer {
        type_name: type_name.to_string(),
        self_type: render(item_impl.self_ty.as_ref()),
        initializer: func.sig.ident.to_string(),
        factory_name,
        return_type,
        access_level: AccessLevel::from_visibility(&func.vis),
        parameters,
        conditional_guard: guard::combine(&guards),
        scope: scope.clone(),
        location,
    })
}

/// `#[resolvable(name = "build")]` renames the synthesized factory
fn factory_name_override(attr: &Attribute) -> Result<Option<String>, String> {
    match &attr.meta {
        Meta::Path(_) => Ok(None),
        Meta::List(_) => {
            let mut name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    syn::parse_str::<syn::Ident>(&lit.value())
                        .map_err(|_| meta.error("factory name must be an identifier"))?;
                    name = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported resolvable option; expected `name = \"..\"`"))
                }
            })
            .map_err(|e| e.to_string())?;
            Ok(name)
        }
        Meta::NameValue(_) => Err("expected `#[resolvable]` or `#[resolvable(name = \"..\")]`".to_string()),
    }
}

/// Classify one parameter by its hint attributes
///
/// # Errors
///
/// - `conflicting_hints` when more than one hint is attached
/// - `invalid_hint` when a hint is malformed
/// - `unsupported_parameter` when the pattern or type cannot be expressed
pub fn classify_parameter(pat_type: &PatType, path: &Path) -> Result<InitializerParameter, Diagnostic> {
    let location = SourceLocation::from_span(path, pat_type.span());

    let mut hints = Vec::new();
    for attr in &pat_type.attrs {
        if let Some(hint) = parse_hint(attr).map_err(|message| {
            Diagnostic::error(SourceLocation::from_span(path, attr.span()), "invalid_hint", message)
        })? {
            hints.push(hint);
        }
    }
    if hints.len() > 1 {
        return Err(Diagnostic::error(
            location,
            "conflicting_hints",
            format!(
                "parameter `{}` carries {} resolution hints; use at most one",
                render(pat_type.pat.as_ref()),
                hints.len()
            ),
        )
        .with_suggestion("keep one of #[argument], #[named(..)] or #[use_default(..)]"));
    }
    let hint = hints.pop().unwrap_or(ParameterResolutionHint::ByType);

    let name = match pat_type.pat.as_ref() {
        Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => pat_ident.ident.to_string(),
        other => {
            return Err(Diagnostic::error(
                location,
                "unsupported_parameter",
                format!(
                    "parameter pattern `{}` is not a plain identifier",
                    render(other)
                ),
            )
            .with_suggestion("bind the parameter to a name and destructure inside the body"));
        }
    };

    if let Some(reason) = unsupported_type(pat_type.ty.as_ref(), &hint) {
        return Err(Diagnostic::error(
            location,
            "unsupported_parameter",
            format!(
                "parameter `{name}: {}` {reason}",
                render(pat_type.ty.as_ref())
            ),
        ));
    }

    Ok(InitializerParameter {
        name,
        ty: render(pat_type.ty.as_ref()),
        hint,
    })
}

fn unsupported_type(ty: &Type, hint: &ParameterResolutionHint) -> Option<&'static str> {
    match ty {
        Type::Tuple(tuple) if !tuple.elems.is_empty() => {
            Some("is an unlabeled tuple; wrap it in a named type")
        }
        Type::BareFn(_) => Some("is a bare function type"),
        Type::Never(_) | Type::Infer(_) => Some("has no concrete type"),
        Type::Macro(_) | Type::Verbatim(_) => Some("has a type the generator cannot read"),
        Type::Paren(paren) => unsupported_type(&paren.elem, hint),
        Type::Group(group) => unsupported_type(&group.elem, hint),
        Type::Reference(_) if hint.is_resolved() => {
            Some("is a reference; the container only hands out owned values")
        }
        Type::ImplTrait(_) if hint.is_resolved() => {
            Some("is `impl Trait`; the container needs a concrete type")
        }
        _ => None,
    }
}

/// The hint carried by one attribute, `Ok(None)` for unrelated attributes
fn parse_hint(attr: &Attribute) -> Result<Option<ParameterResolutionHint>, String> {
    let path = attr.path();
    if path.is_ident(HINT_ARGUMENT) {
        return match &attr.meta {
            Meta::Path(_) => Ok(Some(ParameterResolutionHint::Argument)),
            _ => Err("`#[argument]` takes no value".to_string()),
        };
    }
    if path.is_ident(HINT_NAMED) {
        let lit = match &attr.meta {
            Meta::List(_) => attr.parse_args::<Lit>().map_err(|e| e.to_string())?,
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr_lit) => expr_lit.lit.clone(),
                _ => return Err("`#[named = ..]` expects a string literal".to_string()),
            },
            Meta::Path(_) => return Err("`#[named]` needs a name: `#[named(\"primary\")]`".to_string()),
        };
        return match lit {
            Lit::Str(s) if !s.value().is_empty() => Ok(Some(ParameterResolutionHint::ByName(s.value()))),
            _ => Err("`#[named(..)]` expects a non-empty string literal".to_string()),
        };
    }
    if path.is_ident(HINT_USE_DEFAULT) {
        return match &attr.meta {
            Meta::List(_) => {
                let expr: Expr = attr.parse_args().map_err(|e| e.to_string())?;
                Ok(Some(ParameterResolutionHint::UseDefault(render(&expr))))
            }
            _ => Err("`#[use_default(..)]` needs an expression".to_string()),
        };
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(source: &str) -> (Vec<ResolvableInitializer>, Vec<Diagnostic>) {
        let file = syn::parse_file(source).unwrap();
        let mut diagnostics = Vec::new();
        let initializers =
            extract_initializers(&file, &PathBuf::from("widget.rs"), "make", &mut diagnostics);
        (initializers, diagnostics)
    }

    #[test]
    fn test_classifies_every_hint() {
        let (initializers, diagnostics) = extract(
            r#"
            impl Widget {
                #[resolvable]
                pub fn new(
                    logger: Arc<dyn Logger>,
                    #[named("primary")] db: Database,
                    #[argument] label: String,
                    #[use_default(Duration::from_secs(5))] timeout: Duration,
                    #[named = "replica"] mut replica: Database,
                ) -> Self {
                    todo!()
                }
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let initializer = &initializers[0];
        assert_eq!(initializer.type_name, "Widget");
        assert_eq!(initializer.initializer, "new");
        assert_eq!(initializer.factory_name, "make");
        assert_eq!(initializer.return_type, "Self");
        assert_eq!(initializer.access_level, AccessLevel::Public);
        let hints: Vec<_> = initializer
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.ty.as_str(), p.hint.clone()))
            .collect();
        assert_eq!(
            hints,
            vec![
                ("logger", "Arc<dyn Logger>", ParameterResolutionHint::ByType),
                ("db", "Database", ParameterResolutionHint::ByName("primary".into())),
                ("label", "String", ParameterResolutionHint::Argument),
                (
                    "timeout",
                    "Duration",
                    ParameterResolutionHint::UseDefault("Duration::from_secs(5)".into())
                ),
                ("replica", "Database", ParameterResolutionHint::ByName("replica".into())),
            ]
        );
    }

    #[test]
    fn test_conflicting_hints_abort_only_that_initializer() {
        let (initializers, diagnostics) = extract(
            r#"
            impl Widget {
                #[resolvable]
                pub(crate) fn new(#[argument] #[named("x")] label: String) -> Self { todo!() }
            }
            impl Gadget {
                #[resolvable(name = "build")]
                pub(crate) fn new(logger: Logger) -> Self { todo!() }
            }
            "#,
        );
        assert_eq!(initializers.len(), 1);
        assert_eq!(initializers[0].type_name, "Gadget");
        assert_eq!(initializers[0].factory_name, "build");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, "conflicting_hints");
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn test_unsupported_shapes() {
        let (initializers, diagnostics) = extract(
            r#"
            impl A {
                #[resolvable]
                pub(crate) fn tuple(pair: (u32, u32)) -> Self { todo!() }
                #[resolvable]
                pub(crate) fn pattern(Point { x, y }: Point) -> Self { todo!() }
                #[resolvable]
                pub(crate) fn borrowed(logger: &Logger) -> Self { todo!() }
                #[resolvable]
                pub(crate) fn method(&self) -> Self { todo!() }
                #[resolvable]
                pub(crate) fn forwarded(#[argument] name: &str, #[argument] sink: impl Write) -> Self { todo!() }
            }
            "#,
        );
        let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["unsupported_parameter"; 4]);
        assert_eq!(initializers.len(), 1);
        assert_eq!(initializers[0].initializer, "forwarded");
    }

    #[test]
    fn test_unsupported_initializers() {
        let (initializers, diagnostics) = extract(
            r#"
            impl<T> Holder<T> {
                #[resolvable]
                pub(crate) fn new(value: T) -> Self { todo!() }
            }
            impl A {
                #[resolvable]
                pub(crate) async fn load(logger: Logger) -> Self { todo!() }
                #[resolvable]
                pub(crate) fn pick<T: Default>(value: T) -> Self { todo!() }
                #[resolvable]
                pub(crate) fn init(logger: Logger) { }
            }
            "#,
        );
        assert!(initializers.is_empty());
        let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["unsupported_initializer"; 4]);
    }

    #[test]
    fn test_invalid_hints() {
        let (initializers, diagnostics) = extract(
            r#"
            impl A {
                #[resolvable]
                pub(crate) fn new(#[named("")] a: Database, #[named(1)] b: Database, #[argument(x)] c: u8) -> Self { todo!() }
            }
            "#,
        );
        assert!(initializers.is_empty());
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().all(|d| d.kind == "invalid_hint"));
    }

    #[test]
    fn test_guard_and_unannotated_functions() {
        let (initializers, _) = extract(
            r#"
            #[cfg(feature = "widgets")]
            impl Widget {
                fn plain(logger: Logger) -> Self { todo!() }
                #[cfg(unix)]
                #[assemblygen_macros::resolvable]
                pub(crate) fn new(logger: Logger) -> Self { todo!() }
            }
            impl Trait for Widget {
                #[resolvable]
                fn ignored(logger: Logger) -> Self { todo!() }
            }
            "#,
        );
        assert_eq!(initializers.len(), 1);
        assert_eq!(initializers[0].initializer, "new");
        assert_eq!(initializers[0].access_level, AccessLevel::Internal);
        assert_eq!(
            initializers[0].conditional_guard.as_deref(),
            Some("all(feature = \"widgets\", unix)")
        );
    }

    #[test]
    fn test_initializer_must_be_visible_crate_wide() {
        let (initializers, diagnostics) = extract(
            r#"
            impl Widget {
                #[resolvable]
                fn new(logger: Logger) -> Self { todo!() }
                #[resolvable(name = "build")]
                pub(super) fn with_logger(logger: Logger) -> Self { todo!() }
                #[resolvable(name = "create")]
                pub(in crate) fn create(logger: Logger) -> Self { todo!() }
            }
            "#,
        );
        assert_eq!(initializers.len(), 1);
        assert_eq!(initializers[0].initializer, "create");
        let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["unsupported_initializer"; 2]);
        assert_eq!(
            diagnostics[0].suggestion.as_deref(),
            Some("declare it `pub(crate)` or `pub`")
        );
    }

    #[test]
    fn test_concrete_generic_self_type_is_kept() {
        let (initializers, diagnostics) = extract(
            r#"
            impl Cache<u32> {
                #[resolvable]
                pub fn new(logger: Logger) -> Self { todo!() }
            }
            impl crate::store::Store {
                #[resolvable]
                pub fn open(logger: Logger) -> Self { todo!() }
            }
            "#,
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(initializers[0].type_name, "Cache");
        assert_eq!(initializers[0].self_type, "Cache<u32>");
        assert_eq!(initializers[1].type_name, "Store");
        assert_eq!(initializers[1].self_type, "crate::store::Store");
    }

    #[test]
    fn test_inline_module_scope() {
        let (initializers, diagnostics) = extract(
            r#"
            pub mod inner {
                pub struct Gadget;
                #[cfg(unix)]
                impl Gadget {
                    #[resolvable]
                    pub fn new(logger: Logger) -> Self { todo!() }
                }
                mod sealed {
                    impl super::Gadget {
                        #[resolvable(name = "sealed")]
                        pub fn other(logger: Logger) -> Self { todo!() }
                    }
                }
            }
            "#,
        );
        assert_eq!(initializers.len(), 1);
        assert_eq!(initializers[0].scope.segments, vec!["inner"]);
        assert_eq!(initializers[0].conditional_guard.as_deref(), Some("unix"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, "unreachable_module");
    }
}
