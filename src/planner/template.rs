//! Placeholder substitution for backend command templates.
//!
//! Generator and search backends are configured as command lines with
//! `{name}` placeholders:
//!
//! ```text
//! llm-generate --max-tokens {max_tokens} --temperature {temperature}
//! kubegate-search --k {k} {query}
//! ```
//!
//! - `{name}` - Substitutes the value of variable `name`
//! - `{{` / `}}` - Render literal braces
//!
//! Undefined variables are an error rather than an empty substitution, so a
//! typo in the config fails loudly at the first request.

use std::collections::BTreeMap;
use thiserror::Error;

/// Error type for template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A variable was referenced but not provided.
    #[error("undefined variable '{name}' at position {position} in template")]
    UndefinedVariable { name: String, position: usize },

    /// A `{` was found without a matching `}`.
    #[error("unmatched '{{' at position {position} in template")]
    UnmatchedBrace { position: usize },

    /// An empty variable name was found (`{}`).
    #[error("empty variable name '{{}}' at position {position} in template")]
    EmptyVariableName { position: usize },
}

/// Render a template by substituting variables.
///
/// Every substituted value is passed through `quote`, which lets command
/// templates shell-quote values (a query with spaces stays one argument).
pub fn render_template<F>(
    template: &str,
    variables: &BTreeMap<&str, String>,
    quote: F,
) -> Result<String, TemplateError>
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if chars.next_if(|&(_, c)| c == '{').is_some() => out.push('{'),
            '}' if chars.next_if(|&(_, c)| c == '}').is_some() => out.push('}'),
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => name.push(c),
                        None => return Err(TemplateError::UnmatchedBrace { position: pos }),
                    }
                }

                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyVariableName { position: pos });
                }

                let value = variables
                    .get(name)
                    .ok_or_else(|| TemplateError::UndefinedVariable {
                        name: name.to_string(),
                        position: pos,
                    })?;
                out.push_str(&quote(value));
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Render a command template, shell-quoting every value.
pub fn render_command(
    template: &str,
    variables: &BTreeMap<&str, String>,
) -> Result<String, TemplateError> {
    render_template(template, variables, |v| shell_words::quote(v).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_simple_substitution() {
        let vars = vars(&[("k", "4"), ("query", "restart")]);
        let out = render_template("search --k {k} {query}", &vars, str::to_string).unwrap();
        assert_eq!(out, "search --k 4 restart");
    }

    #[test]
    fn test_whitespace_in_placeholder_is_trimmed() {
        let vars = vars(&[("k", "4")]);
        let out = render_template("--k { k }", &vars, str::to_string).unwrap();
        assert_eq!(out, "--k 4");
    }

    #[test]
    fn test_escaped_braces() {
        let out = render_template("{{\"a\": 1}}", &BTreeMap::new(), str::to_string).unwrap();
        assert_eq!(out, "{\"a\": 1}");
    }

    #[test]
    fn test_lone_closing_brace_is_literal() {
        let out = render_template("a } b", &BTreeMap::new(), str::to_string).unwrap();
        assert_eq!(out, "a } b");
    }

    #[test]
    fn test_undefined_variable_errors() {
        let err = render_template("x {missing}", &BTreeMap::new(), str::to_string).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedVariable {
                name: "missing".to_string(),
                position: 2
            }
        );
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn test_unmatched_and_empty_braces_error() {
        assert_eq!(
            render_template("abc {k", &BTreeMap::new(), str::to_string),
            Err(TemplateError::UnmatchedBrace { position: 4 })
        );
        assert_eq!(
            render_template("{}", &BTreeMap::new(), str::to_string),
            Err(TemplateError::EmptyVariableName { position: 0 })
        );
    }

    #[test]
    fn test_render_command_quotes_values() {
        let vars = vars(&[("query", "restart deployment api"), ("k", "4")]);
        let out = render_command("search --k {k} {query}", &vars).unwrap();
        assert_eq!(out, "search --k 4 'restart deployment api'");
        assert_eq!(
            shell_words::split(&out).unwrap(),
            vec!["search", "--k", "4", "restart deployment api"]
        );
    }
}
