//! Rust identifiers for schema names.
//!
//! Schema names are wire strings and can be anything: keywords (`type`),
//! names starting with a digit, or characters Rust does not accept in an
//! identifier. Every identifier the generator emits goes through here.

use std::collections::HashSet;

use convert_case::{Case, Casing};
use proc_macro2::Ident;
use quote::format_ident;

/// Field name reserved for the embedded parent value.
pub const BASE_FIELD: &str = "base";

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Replaces characters that cannot appear in an identifier.
fn clean(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn to_ident(name: String, digit_prefix: &str, fallback: &str) -> Ident {
    let mut name = if name.is_empty() || name.chars().all(|c| c == '_') {
        fallback.to_string()
    } else {
        name
    };
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name = format!("{}{}", digit_prefix, name);
    }

    if RESERVED.contains(&name.as_str()) {
        format_ident!("{}_", name)
    } else if KEYWORDS.contains(&name.as_str()) {
        format_ident!("r#{}", name)
    } else {
        format_ident!("{}", name)
    }
}

/// Type identifier: the wire name, made valid.
///
/// ## Examples
///
/// ```
/// use vmomi_gen::naming::type_ident;
///
/// assert_eq!(type_ident("VirtualMachine").to_string(), "VirtualMachine");
/// assert_eq!(type_ident("8021qInfo").to_string(), "T8021qInfo");
/// ```
pub fn type_ident(wire_name: &str) -> Ident {
    to_ident(clean(wire_name), "T", "Unnamed")
}

/// Field identifier: snake case, never `base`.
///
/// ## Examples
///
/// ```
/// use vmomi_gen::naming::field_ident;
///
/// assert_eq!(field_ident("powerState").to_string(), "power_state");
/// assert_eq!(field_ident("type").to_string(), "r#type");
/// assert_eq!(field_ident("base").to_string(), "base_");
/// ```
pub fn field_ident(wire_name: &str) -> Ident {
    let snake = clean(&wire_name.to_case(Case::Snake));
    if snake == BASE_FIELD {
        return format_ident!("{}_", BASE_FIELD);
    }
    to_ident(snake, "f_", "field")
}

/// Method identifier: snake case.
pub fn method_ident(name: &str) -> Ident {
    to_ident(clean(&name.to_case(Case::Snake)), "m_", "method")
}

/// Enum variant identifier: the camel-cased wire value in Pascal case.
///
/// ## Examples
///
/// ```
/// use vmomi_gen::naming::variant_ident;
///
/// assert_eq!(variant_ident("poweredOn").to_string(), "PoweredOn");
/// assert_eq!(variant_ident("vmx-07").to_string(), "Vmx07");
/// assert_eq!(variant_ident("1").to_string(), "V1");
/// ```
pub fn variant_ident(value: &str) -> Ident {
    to_ident(clean(&value.to_case(Case::Pascal)), "V", "Empty")
}

/// Name of the arguments struct of a method.
pub fn args_ident(type_wire_name: &str, method_name: &str) -> Ident {
    let method = clean(&method_name.to_case(Case::Pascal));
    to_ident(format!("{}{}Args", clean(type_wire_name), method), "T", "Args")
}

/// Hands out identifiers, suffixing repeats so each is unique in its scope.
#[derive(Debug, Default)]
pub struct IdentScope {
    used: HashSet<String>,
}

impl IdentScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a name up front so later claims avoid it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn claim(&mut self, ident: Ident) -> Ident {
        let name = ident.to_string();
        if self.used.insert(name.clone()) {
            return ident;
        }

        let stem = name.trim_start_matches("r#");
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", stem, n);
            if self.used.insert(candidate.clone()) {
                return format_ident!("{}", candidate);
            }
            n += 1;
        }
    }
}
