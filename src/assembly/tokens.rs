//! Canonical text for types and expressions.
//!
//! `TokenStream::to_string()` puts a space between every token
//! (`Vec < String >`). Service types are compared and emitted as text, so they
//! are printed here with conventional Rust spacing instead, independent of how
//! the author formatted the source.

use proc_macro2::{Delimiter, Group, Spacing, TokenStream, TokenTree};
use quote::ToTokens;

/// Operators written with a space on both sides.
const BINARY_OPS: &[&str] = &[
    "=", "==", "!=", "<=", ">=", "&&", "||", "+", "+=", "-=", "*=", "/=", "->", "=>", "..=",
];

/// Operators followed, but not preceded, by a space.
const TRAILING_SPACE_OPS: &[&str] = &[",", ";", ":"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Last {
    Start,
    Word,
    Close,
    Op(String),
}

/// Render any syntax node as canonical text
pub fn render<T: ToTokens>(node: &T) -> String {
    render_stream(node.to_token_stream())
}

/// Render a token stream as canonical text
pub fn render_stream(tokens: TokenStream) -> String {
    let mut out = String::new();
    write_stream(&mut out, tokens);
    out
}

/// Canonical text of a type written as a string (`"Arc<dyn Logger >"`)
///
/// Returns `None` when the text does not parse as a type.
pub fn canonical_type(text: &str) -> Option<String> {
    syn::parse_str::<syn::Type>(text).ok().map(|ty| render(&ty))
}

/// Render `node` with every `Self` token replaced by `replacement`
pub fn render_with_self<T: ToTokens>(node: &T, replacement: &TokenStream) -> String {
    render_stream(substitute_self(node.to_token_stream(), replacement))
}

fn substitute_self(tokens: TokenStream, replacement: &TokenStream) -> TokenStream {
    let mut out = TokenStream::new();
    for tree in tokens {
        match tree {
            TokenTree::Ident(ident) if ident == "Self" => out.extend(replacement.clone()),
            TokenTree::Group(group) => {
                let mut replaced = Group::new(group.delimiter(), substitute_self(group.stream(), replacement));
                replaced.set_span(group.span());
                out.extend([TokenTree::Group(replaced)]);
            }
            other => out.extend([other]),
        }
    }
    out
}

fn write_stream(out: &mut String, tokens: TokenStream) {
    let mut last = Last::Start;
    let mut pending = String::new();

    for tree in tokens {
        match tree {
            TokenTree::Punct(punct) => {
                if punct.as_char() == '\'' {
                    // Lifetime tick: glued to the identifier that follows.
                    flush(out, &mut pending, &mut last);
                    space_before_word(out, &last);
                    out.push('\'');
                    last = Last::Op("'".to_string());
                    continue;
                }
                pending.push(punct.as_char());
                if punct.spacing() == Spacing::Alone {
                    let op = std::mem::take(&mut pending);
                    write_op(out, &last, &op);
                    last = Last::Op(op);
                }
            }
            TokenTree::Ident(ident) => {
                flush(out, &mut pending, &mut last);
                space_before_word(out, &last);
                out.push_str(&ident.to_string());
                last = Last::Word;
            }
            TokenTree::Literal(lit) => {
                flush(out, &mut pending, &mut last);
                space_before_word(out, &last);
                out.push_str(&lit.to_string());
                last = Last::Word;
            }
            TokenTree::Group(group) => {
                flush(out, &mut pending, &mut last);
                match group.delimiter() {
                    Delimiter::Parenthesis | Delimiter::Bracket => {
                        if matches!(&last, Last::Op(op) if needs_space_after(op)) {
                            out.push(' ');
                        }
                        let (open, close) = if group.delimiter() == Delimiter::Parenthesis {
                            ('(', ')')
                        } else {
                            ('[', ']')
                        };
                        out.push(open);
                        write_stream(out, group.stream());
                        out.push(close);
                    }
                    Delimiter::Brace => {
                        let inner = render_stream(group.stream());
                        if last == Last::Op("::".to_string()) {
                            // `use` tree group: `std::{fmt, io}`
                            out.push('{');
                            out.push_str(&inner);
                            out.push('}');
                            last = Last::Close;
                            continue;
                        }
                        if last != Last::Start {
                            out.push(' ');
                        }
                        if inner.is_empty() {
                            out.push_str("{}");
                        } else {
                            out.push_str("{ ");
                            out.push_str(&inner);
                            out.push_str(" }");
                        }
                    }
                    Delimiter::None => write_stream(out, group.stream()),
                }
                last = Last::Close;
            }
        }
    }
    flush(out, &mut pending, &mut last);
}

fn flush(out: &mut String, pending: &mut String, last: &mut Last) {
    if !pending.is_empty() {
        let op = std::mem::take(pending);
        write_op(out, last, &op);
        *last = Last::Op(op);
    }
}

fn write_op(out: &mut String, last: &Last, op: &str) {
    let after_operand = matches!(last, Last::Word | Last::Close);
    let spaced = BINARY_OPS.contains(&op)
        || (after_operand && matches!(op, "-" | "*" | "/" | "%" | "&" | "|"));
    if spaced && *last != Last::Start {
        out.push(' ');
    }
    out.push_str(op);
}

fn needs_space_after(op: &str) -> bool {
    BINARY_OPS.contains(&op) || TRAILING_SPACE_OPS.contains(&op)
}

fn space_before_word(out: &mut String, last: &Last) {
    match last {
        Last::Word | Last::Close => out.push(' '),
        Last::Op(op) if needs_space_after(op) => out.push(' '),
        Last::Op(op) if matches!(op.as_str(), "-" | "*" | "/" | "%" | "&" | "|") => {
            // Binary when written after an operand; the space was already
            // pushed before the operator in that case.
            if out.ends_with(&format!(" {op}")) {
                out.push(' ');
            }
        }
        _ => {}
    }
}
