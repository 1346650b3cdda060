use crate::error::GrammarError;
use heck::{ToPascalCase, ToSnakeCase};
use proc_macro2::Ident;
use quote::format_ident;

/// Accessor names generated on every collection; a folder named after one of
/// them would produce a duplicate method.
const RESERVED_ACCESSORS: &[&str] = &["new", "location"];

/// Identifiers that cannot be written as raw identifiers either.
const UNRAWABLE: &[&str] = &["self", "super", "crate", "extern", "_"];

/// PascalCase type prefix for a segment name.
/// e.g. "user" -> "User", "user_profile" -> "UserProfile", "my-docs" -> "MyDocs"
pub fn title(name: &str) -> String {
    name.to_pascal_case()
}

/// snake_case accessor stem for a segment name.
/// e.g. "users" -> "users", "UserProfile" -> "user_profile"
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Check that a segment name yields usable type and method identifiers.
pub fn check_segment(name: &str) -> Result<(), GrammarError> {
    let stem = snake(name);
    if syn::parse_str::<Ident>(&title(name)).is_err() || stem.is_empty() {
        return Err(GrammarError::InvalidSegment(name.to_string()));
    }
    if UNRAWABLE.contains(&stem.as_str()) {
        return Err(GrammarError::InvalidSegment(name.to_string()));
    }
    if RESERVED_ACCESSORS.contains(&stem.as_str()) {
        return Err(GrammarError::ReservedSegment(name.to_string()));
    }
    Ok(())
}

/// Accessor identifier for a segment, using raw identifier syntax for keywords.
pub fn method_ident(name: &str) -> Ident {
    let stem = snake(name);
    if is_keyword(&stem) {
        format_ident!("r#{}", stem)
    } else {
        format_ident!("{}", stem)
    }
}

/// e.g. ("get", "user", "") -> `get_user`, ("list", "user", "s") -> `list_users`
pub fn affixed_ident(prefix: &str, name: &str, suffix: &str) -> Ident {
    format_ident!("{}_{}{}", prefix, snake(name), suffix)
}

/// Typed decode accessor for a record target.
/// e.g. `User` -> `to_user`, `models::MetaInfo` -> `to_meta_info`
pub fn target_accessor(target: &syn::Path) -> Ident {
    format_ident!("to_{}", target_stem(target))
}

/// snake_case name of the last segment of a target path.
pub fn target_stem(target: &syn::Path) -> String {
    target
        .segments
        .last()
        .map(|segment| snake(&segment.ident.to_string()))
        .unwrap_or_default()
}

/// Format a type path without the token spacing `quote` inserts.
pub fn path_text(path: &syn::Path) -> String {
    quote::quote!(#path).to_string().replace(' ', "")
}

fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "type" | "struct" | "enum" | "fn" | "let" | "mut" | "ref" | "mod" | "use" | "pub"
            | "impl" | "trait" | "for" | "loop" | "while" | "if" | "else" | "match"
            | "return" | "break" | "continue" | "as" | "in" | "where" | "async" | "await"
            | "dyn" | "move" | "static" | "const" | "unsafe" | "true" | "false"
            | "abstract" | "become" | "box" | "do" | "final" | "macro" | "override"
            | "priv" | "typeof" | "unsized" | "virtual" | "yield" | "try" | "gen"
    )
}
