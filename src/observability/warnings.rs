//! Construction-time warnings.

use crate::routing::{Mask, ResolvedMask};

/// Warning for a URL mask that carries query parameters, if it does.
///
/// Query parameters never take part in matching, so they belong in the
/// resolver. The message names each parameter and shows how to read it there.
pub fn redundant_query_warning(method: &str, mask: &Mask, resolved: &ResolvedMask) -> Option<String> {
    resolved.search()?;
    let pathname = resolved.pathname()?;
    let params = resolved.query_param_names();

    let reads: Vec<String> = params
        .iter()
        .map(|name| format!("    let {} = req.query(\"{}\");", binding_name(name), name))
        .collect();

    let mut lines = vec![
        format!(
            "Found a redundant usage of query parameters in the request handler URL for \"{} {}\". \
             Please match against a path instead, and access query parameters in the response resolver function:",
            method.to_ascii_uppercase(),
            mask
        ),
        String::new(),
        format!(
            "rest.{}(\"{}\", |req, res, ctx| async move {{",
            method.to_ascii_lowercase(),
            pathname
        ),
    ];
    lines.extend(reads);
    lines.push("    Ok(res.compose([])?)".to_string());
    lines.push("})".to_string());
    Some(lines.join("\n"))
}

/// Turn a query parameter name into a usable variable name.
fn binding_name(param: &str) -> String {
    let mut name: String = param
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if KEYWORDS.contains(&name.as_str()) {
        if RAW_FORBIDDEN.contains(&name.as_str()) {
            name.push('_');
        } else {
            name.insert_str(0, "r#");
        }
    }
    name
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RAW_FORBIDDEN: &[&str] = &["crate", "self", "super"];
