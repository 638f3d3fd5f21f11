//! Registration extraction.
//!
//! Walks the assemble function of every assembly in a parsed file and turns
//! each recognized registration call into a [`Registration`].
//!
//! ```text
//! impl ModuleAssembly for AppAssembly {
//!     fn assemble(&self, container: &mut Container) {
//!         container.register::<Arc<dyn Logger>>(|_| Arc::new(ConsoleLogger)); // unnamed
//!         container.autoregister_named::<Database, _>(Database::new, "primary"); // named
//!         #[cfg(feature = "metrics")]
//!         container.register_into_collection::<Box<dyn Plugin>>(|_| Box::new(Metrics));
//!     }
//! }
//! ```
//!
//! Calls outside the vocabulary are ordinary code and ignored. A recognized
//! call whose service type or name cannot be determined statically is skipped
//! with a warning; the rest of the file is still extracted.

use std::collections::HashMap;
use std::path::Path;

use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::visit::{self, Visit};
use syn::{
    Attribute, Expr, ExprIf, ExprMethodCall, GenericArgument, ImplItem, Item, ItemImpl, Lit,
    PathArguments, ReturnType, Stmt, Type,
};

use super::guard;
use super::tokens::render_with_self;
use super::types::{AccessLevel, Assembly, ModuleScope, Registration};
use super::vocabulary::{RegistrationMethod, RegistrationVocabulary};
use crate::diagnostics::{Diagnostic, SourceLocation};

/// Inputs of the extractor besides the syntax tree
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions<'a> {
    pub vocabulary: &'a RegistrationVocabulary,
    /// Name of the function holding registrations
    pub assemble_function: &'a str,
    /// Access level for assemblies whose type is declared elsewhere
    pub default_access: AccessLevel,
}

/// Extract every assembly declared in `file`
///
/// # Arguments
///
/// * `file` - Parsed source file
/// * `path` - Path used in source locations
/// * `options` - Vocabulary and naming options
/// * `diagnostics` - Receives a warning per skipped registration
///
/// # Returns
///
/// Assemblies in source order, each with its registrations in source order
pub fn extract_assemblies(
    file: &syn::File,
    path: &Path,
    options: ExtractOptions<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Assembly> {
    let mut declared = HashMap::new();
    collect_declared_types(&file.items, &mut declared);

    let mut impls = Vec::new();
    collect_scoped_impls(&file.items, &ModuleScope::default(), &mut impls);

    let mut assemblies = Vec::new();
    for ScopedImpl { item: item_impl, scope } in impls {
        let Some(name) = self_type_name(&item_impl.self_ty) else {
            continue;
        };
        for impl_item in &item_impl.items {
            let ImplItem::Fn(func) = impl_item else {
                continue;
            };
            if func.sig.ident != options.assemble_function {
                continue;
            }

            let location = SourceLocation::from_span(path, func.sig.ident.span());
            if let Some(module) = &scope.private_module {
                diagnostics.push(unreachable_module(location, &name, module));
                continue;
            }

            let access_level = declared
                .get(&name)
                .copied()
                .unwrap_or(options.default_access);
            let mut guards = scope.guards.clone();
            guards.extend(guard::cfg_predicates(&item_impl.attrs));
            guards.extend(guard::cfg_predicates(&func.attrs));

            let mut visitor = RegistrationVisitor {
                path,
                vocabulary: options.vocabulary,
                self_type: item_impl.self_ty.to_token_stream(),
                access_level,
                guards,
                registrations: Vec::new(),
                diagnostics: &mut *diagnostics,
            };
            visitor.visit_block(&func.block);
            let registrations = visitor.registrations;

            tracing::debug!(
                assembly = %name,
                registrations = registrations.len(),
                "extracted assembly"
            );
            assemblies.push(Assembly {
                name: name.clone(),
                access_level,
                registrations,
                scope: scope.clone(),
                location,
            });
        }
    }
    assemblies
}

/// Flag unnamed, non-collection registrations declared twice in one assembly.
///
/// Two registrations of a type conflict when either one is unguarded (it
/// coexists with every configuration of the other) or both sit behind the
/// same guard. Registrations behind two different `cfg` predicates are taken
/// as alternatives.
pub fn validate_unique_registrations(assembly: &Assembly, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, Vec<&Registration>> = HashMap::new();
    for registration in &assembly.registrations {
        if registration.name.is_some() || registration.into_collection {
            continue;
        }
        let earlier = seen.entry(registration.service_type.as_str()).or_default();
        let conflict = earlier.iter().copied().find(|first| {
            match (&first.conditional_guard, &registration.conditional_guard) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
        });
        if let Some(first) = conflict {
            diagnostics.push(
                Diagnostic::error(
                    registration.location.clone(),
                    "duplicate_registration",
                    format!(
                        "`{}` is registered more than once in `{}`",
                        registration.service_type, assembly.name
                    ),
                )
                .with_related(first.location.clone())
                .with_suggestion("give one of the registrations a name or remove it"),
            );
        } else {
            earlier.push(registration);
        }
    }
}

/// Error for a declaration inside an inline module generated code cannot name
pub(crate) fn unreachable_module(location: SourceLocation, declaration: &str, module: &str) -> Diagnostic {
    Diagnostic::error(
        location,
        "unreachable_module",
        format!("`{declaration}` is declared inside private module `{module}`"),
    )
    .with_suggestion("declare the module `pub(crate)` so generated code can import it")
}

fn collect_declared_types(items: &[Item], declared: &mut HashMap<String, AccessLevel>) {
    for item in items {
        match item {
            Item::Struct(s) => {
                declared.insert(s.ident.to_string(), AccessLevel::from_visibility(&s.vis));
            }
            Item::Enum(e) => {
                declared.insert(e.ident.to_string(), AccessLevel::from_visibility(&e.vis));
            }
            Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    collect_declared_types(items, declared);
                }
            }
            _ => {}
        }
    }
}

/// An `impl` block and the inline modules enclosing it
pub(crate) struct ScopedImpl<'a> {
    pub item: &'a ItemImpl,
    pub scope: ModuleScope,
}

/// Every `impl` block of `items`, descending into inline modules
pub(crate) fn collect_scoped_impls<'a>(
    items: &'a [Item],
    scope: &ModuleScope,
    impls: &mut Vec<ScopedImpl<'a>>,
) {
    for item in items {
        match item {
            Item::Impl(item_impl) => impls.push(ScopedImpl {
                item: item_impl,
                scope: scope.clone(),
            }),
            Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    collect_scoped_impls(items, &scope.enter(m), impls);
                }
            }
            _ => {}
        }
    }
}

/// Identifier of an `impl` block's self type (`AppAssembly` for `impl X for crate::AppAssembly`)
pub(crate) fn self_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

struct RegistrationVisitor<'a, 'd> {
    path: &'a Path,
    vocabulary: &'a RegistrationVocabulary,
    /// Self type of the `impl` block; replaces `Self` in extracted types
    self_type: TokenStream,
    access_level: AccessLevel,
    guards: Vec<String>,
    registrations: Vec<Registration>,
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl RegistrationVisitor<'_, '_> {
    fn render_type<T: ToTokens>(&self, node: &T) -> String {
        render_with_self(node, &self.self_type)
    }

    fn record(&mut self, call: &ExprMethodCall, method: &RegistrationMethod) {
        let location = SourceLocation::from_span(self.path, call.method.span());
        let mut args: Vec<&Expr> = call.args.iter().collect();

        let name = if method.named {
            let Some(name) = literal_name(&call.args) else {
                self.skip(
                    location,
                    "dynamic_name",
                    format!(
                        "`{}` needs a non-empty string literal as its last argument",
                        method.method
                    ),
                );
                return;
            };
            args.pop();
            Some(name)
        } else {
            None
        };

        let factory = args.last().copied();
        let generics = turbofish_types(call);

        let service_type = generics
            .first()
            .filter(|ty| !matches!(ty, Type::Infer(_)))
            .map(|ty| self.render_type(*ty))
            .or_else(|| factory.and_then(|f| infer_service_type(f, &self.self_type)));
        let Some(service_type) = service_type else {
            self.skip(
                location,
                "unresolved_service_type",
                format!(
                    "cannot determine the service type registered by `{}`",
                    method.method
                ),
            );
            return;
        };

        let arguments = match generics.get(1) {
            Some(Type::Tuple(tuple)) => tuple.elems.iter().map(|ty| self.render_type(ty)).collect(),
            _ => match factory.map(|f| closure_arguments(f, &self.self_type)) {
                Some(Ok(arguments)) => arguments,
                Some(Err(index)) => {
                    self.skip(
                        location,
                        "untyped_argument",
                        format!(
                            "runtime argument #{index} of the `{service_type}` factory has no type annotation"
                        ),
                    );
                    return;
                }
                None => Vec::new(),
            },
        };

        let factory_name = match factory {
            Some(Expr::Path(expr_path)) => Some(self.render_type(&expr_path.path)),
            _ => None,
        };

        tracing::debug!(
            service_type = %service_type,
            name = ?name,
            method = %method.method,
            "found registration"
        );
        self.registrations.push(Registration {
            service_type,
            factory_name,
            access_level: self.access_level,
            name,
            arguments,
            into_collection: method.into_collection,
            conditional_guard: guard::combine(&self.guards),
            method: method.method.clone(),
            location,
        });
    }

    fn skip(&mut self, location: SourceLocation, kind: &str, message: String) {
        tracing::warn!(location = %location, kind, "{message}");
        self.diagnostics
            .push(Diagnostic::warning(location, kind, message).with_suggestion(match kind {
                "unresolved_service_type" => {
                    "name the type with a turbofish, e.g. `register::<MyService>(..)`"
                }
                "untyped_argument" => "annotate the closure parameter, e.g. `|r, label: String|`",
                _ => "pass the name as a string literal",
            }));
    }

    fn with_guard(&mut self, predicate: String, walk: impl FnOnce(&mut Self)) {
        self.guards.push(predicate);
        walk(self);
        self.guards.pop();
    }
}

/// The non-empty string literal in trailing argument position
fn literal_name(args: &syn::punctuated::Punctuated<Expr, syn::Token![,]>) -> Option<String> {
    match args.last() {
        Some(Expr::Lit(expr_lit)) => match &expr_lit.lit {
            Lit::Str(s) if !s.value().is_empty() => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

impl<'ast> Visit<'ast> for RegistrationVisitor<'_, '_> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        let predicates = guard::cfg_predicates(stmt_attrs(stmt));
        let depth = self.guards.len();
        self.guards.extend(predicates);
        visit::visit_stmt(self, stmt);
        self.guards.truncate(depth);
    }

    fn visit_expr_if(&mut self, node: &'ast ExprIf) {
        let Some(predicate) = guard::cfg_macro_predicate(&node.cond) else {
            visit::visit_expr_if(self, node);
            return;
        };
        self.with_guard(predicate.clone(), |v| v.visit_block(&node.then_branch));
        if let Some((_, else_branch)) = &node.else_branch {
            self.with_guard(guard::negate(&predicate), |v| v.visit_expr(else_branch));
        }
    }

    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        // Receiver first: in `c.register::<A>(..).register::<B>(..)` A comes first.
        self.visit_expr(&call.receiver);
        let vocabulary = self.vocabulary;
        if let Some(method) = vocabulary.get(&call.method.to_string()) {
            self.record(call, method);
        }
        for arg in &call.args {
            self.visit_expr(arg);
        }
    }

    fn visit_item(&mut self, _item: &'ast Item) {
        // Items nested in the body (helper fns, consts) are not registrations.
    }
}

fn stmt_attrs(stmt: &Stmt) -> &[Attribute] {
    match stmt {
        Stmt::Local(local) => &local.attrs,
        Stmt::Expr(expr, _) => expr_attrs(expr),
        Stmt::Macro(mac) => &mac.attrs,
        Stmt::Item(_) => &[],
    }
}

fn expr_attrs(expr: &Expr) -> &[Attribute] {
    match expr {
        Expr::MethodCall(e) => &e.attrs,
        Expr::Call(e) => &e.attrs,
        Expr::Block(e) => &e.attrs,
        Expr::If(e) => &e.attrs,
        Expr::ForLoop(e) => &e.attrs,
        Expr::Unsafe(e) => &e.attrs,
        Expr::Macro(e) => &e.attrs,
        Expr::Try(e) => &e.attrs,
        Expr::Await(e) => &e.attrs,
        Expr::Paren(e) => &e.attrs,
        Expr::Assign(e) => &e.attrs,
        _ => &[],
    }
}

fn turbofish_types(call: &ExprMethodCall) -> Vec<&Type> {
    call.turbofish
        .iter()
        .flat_map(|generics| generics.args.iter())
        .filter_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

/// Service type implied by the factory when no turbofish names it
///
/// `Self` stands for `self_type`, so `Self::new` registers the assembly type.
fn infer_service_type(factory: &Expr, self_type: &TokenStream) -> Option<String> {
    match factory {
        // `ConsoleLogger::new` registers `ConsoleLogger`
        Expr::Path(expr_path) if expr_path.path.segments.len() >= 2 => {
            let mut path = expr_path.path.clone();
            path.segments.pop();
            path.segments.pop_punct();
            for segment in path.segments.iter_mut() {
                if let PathArguments::AngleBracketed(args) = &mut segment.arguments {
                    args.colon2_token = None;
                }
            }
            Some(render_with_self(&path, self_type))
        }
        Expr::Closure(closure) => match &closure.output {
            ReturnType::Type(_, ty) => Some(render_with_self(ty.as_ref(), self_type)),
            ReturnType::Default => None,
        },
        _ => None,
    }
}

/// Typed runtime parameters of a closure factory, after the resolver parameter.
///
/// `Err(n)` is the 1-based index of the first untyped runtime parameter.
fn closure_arguments(factory: &Expr, self_type: &TokenStream) -> Result<Vec<String>, usize> {
    let Expr::Closure(closure) = factory else {
        return Ok(Vec::new());
    };
    closure
        .inputs
        .iter()
        .skip(1)
        .enumerate()
        .map(|(index, input)| match input {
            syn::Pat::Type(pat_type) => Ok(render_with_self(pat_type.ty.as_ref(), self_type)),
            _ => Err(index + 1),
        })
        .collect()
}
