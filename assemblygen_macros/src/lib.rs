//! The `#[resolvable]` attribute.
//!
//! `assemblygen` reads `#[resolvable]` initializers and their parameter hints
//! (`#[argument]`, `#[named("tag")]`, `#[use_default(expr)]`) from source and
//! generates the factories. This attribute only makes the annotated source
//! compile: it checks the attribute arguments, strips the hint attributes
//! from the parameters and rejects parameters carrying more than one hint.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse::Parser, FnArg, ImplItemFn, LitStr};

const HINTS: [&str; 3] = ["argument", "named", "use_default"];

#[proc_macro_attribute]
pub fn resolvable(attr: TokenStream, item: TokenStream) -> TokenStream {
    match expand(attr.into(), item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(attr: TokenStream2, item: TokenStream2) -> syn::Result<TokenStream2> {
    parse_args(attr)?;
    let mut func: ImplItemFn = syn::parse2(item)?;
    if let Some(receiver) = func.sig.receiver() {
        return Err(syn::Error::new_spanned(
            receiver,
            "#[resolvable] initializers are associated functions without `self`",
        ));
    }

    let mut errors: Option<syn::Error> = None;
    for input in func.sig.inputs.iter_mut() {
        let FnArg::Typed(pat) = input else { continue };
        let (hints, kept): (Vec<_>, Vec<_>) =
            pat.attrs.drain(..).partition(|a| is_hint(a.path()));
        pat.attrs = kept;
        if hints.len() > 1 {
            let err = syn::Error::new_spanned(
                &hints[1],
                "a parameter takes at most one of #[argument], #[named] and #[use_default]",
            );
            match errors.as_mut() {
                Some(all) => all.combine(err),
                None => errors = Some(err),
            }
        }
    }
    if let Some(err) = errors {
        return Err(err);
    }
    Ok(quote! { #func })
}

/// Accepts nothing or `name = "<ident>"`
fn parse_args(attr: TokenStream2) -> syn::Result<()> {
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            syn::parse_str::<syn::Ident>(&lit.value())
                .map_err(|_| syn::Error::new(lit.span(), "factory name must be an identifier"))?;
            Ok(())
        } else {
            Err(meta.error("unsupported #[resolvable] argument, expected `name = \"...\"`"))
        }
    });
    parser.parse2(attr)
}

fn is_hint(path: &syn::Path) -> bool {
    path.segments
        .last()
        .is_some_and(|seg| HINTS.iter().any(|h| seg.ident == h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(attr: &str, item: &str) -> syn::Result<String> {
        expand(attr.parse().unwrap(), item.parse().unwrap()).map(|t| t.to_string())
    }

    #[test]
    fn test_hints_are_stripped() {
        let out = expand_str(
            "",
            r#"pub fn new(#[named("primary")] db: Database, #[argument] label: String, #[allow(unused)] n: u32) -> Self { todo!() }"#,
        )
        .unwrap();
        assert!(!out.contains("named"));
        assert!(!out.contains("argument"));
        assert!(out.contains("allow"));
        assert!(out.contains("db : Database"));
        assert!(out.contains("label : String"));
    }

    #[test]
    fn test_conflicting_hints_rejected() {
        let err = expand_str("", "fn new(#[argument] #[use_default(3)] n: u32) -> Self { todo!() }")
            .unwrap_err();
        assert!(err.to_string().contains("at most one"));
    }

    #[test]
    fn test_name_argument() {
        assert!(expand_str(r#"name = "build""#, "fn new() -> Self { todo!() }").is_ok());
        assert!(expand_str(r#"name = "not an ident""#, "fn new() -> Self { todo!() }").is_err());
        assert!(expand_str(r#"label = "x""#, "fn new() -> Self { todo!() }").is_err());
    }

    #[test]
    fn test_receiver_rejected() {
        assert!(expand_str("", "fn new(&self) -> Self { todo!() }").is_err());
    }
}
