//! Placeholder substitution and archive document assembly.
//!
//! Substitution is literal: every `{{Name}}` token listed by the template
//! definition is replaced with the request value of the same name, all
//! occurrences at once, in definition order. Tokens the definition does not
//! list are left in place.

use crate::catalog::TemplateDefinition;
use crate::contract::MailRequest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// HTML-escape request values before they are embedded.
    pub escape_values: bool,
}

pub fn placeholder_token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

pub fn render_template(
    template: &str,
    definition: &TemplateDefinition,
    request: &MailRequest,
    options: RenderOptions,
) -> String {
    let mut rendered = template.to_string();
    for name in &definition.placeholders {
        let Some(value) = request.get(name) else {
            continue;
        };
        let replacement = if options.escape_values {
            escape_html(value)
        } else {
            value.to_string()
        };
        rendered = rendered.replace(&placeholder_token(name), &replacement);
    }
    rendered
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The stored audit copy: rendered body followed by the original request.
pub fn archive_document(
    rendered: &str,
    request: &MailRequest,
) -> Result<String, serde_json::Error> {
    let parameters = serde_json::to_string(request)?;
    Ok(format!("<html>{rendered}<br><br>Parameters: {parameters}</html>"))
}
