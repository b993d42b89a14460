use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Placeholder syntax: `{{ env.NAME }}` or `{{ env.NAME | default("value") }}`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Substitute environment placeholders in raw config text
///
/// Runs before TOML parsing so the config types only ever see plain strings.
/// Comment lines are copied through untouched, which lets a config keep
/// commented-out entries referencing variables that are not set.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.split('\n') {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    Ok(lines.join("\n"))
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut failure = None;

    let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
        match resolve(&captures[1], captures.get(2).map(|m| m.as_str())) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[server]\nlisten_address = \"0.0.0.0:8000\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_set_variable() {
        temp_env::with_var("VIBELOG_WORKER_KEY", Some("sk-123"), || {
            let result = expand_env("api_key = \"{{ env.VIBELOG_WORKER_KEY }}\"").unwrap();
            assert_eq!(result, "api_key = \"sk-123\"");
        });
    }

    #[test]
    fn substitutes_several_variables_on_one_line() {
        let vars = [("VIBELOG_HOST", Some("worker")), ("VIBELOG_PORT", Some("9000"))];
        temp_env::with_vars(vars, || {
            let result = expand_env("url = \"http://{{ env.VIBELOG_HOST }}:{{env.VIBELOG_PORT}}/\"").unwrap();
            assert_eq!(result, "url = \"http://worker:9000/\"");
        });
    }

    #[test]
    fn unset_variable_is_an_error() {
        temp_env::with_var_unset("VIBELOG_MISSING", || {
            let err = expand_env("key = \"{{ env.VIBELOG_MISSING }}\"").unwrap_err();
            assert!(err.contains("VIBELOG_MISSING"));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("VIBELOG_GPU", || {
            let result = expand_env("gpu = \"{{ env.VIBELOG_GPU | default(\"T4\") }}\"").unwrap();
            assert_eq!(result, "gpu = \"T4\"");
        });

        temp_env::with_var("VIBELOG_GPU", Some("A10G"), || {
            let result = expand_env("gpu = \"{{ env.VIBELOG_GPU | default(\"T4\") }}\"").unwrap();
            assert_eq!(result, "gpu = \"A10G\"");
        });
    }

    #[test]
    fn non_env_scope_is_rejected() {
        let err = expand_env("key = \"{{ secrets.KEY }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));

        let err = expand_env("key = \"{{ env.A.B }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("VIBELOG_MISSING", || {
            let input = "  # api_key = \"{{ env.VIBELOG_MISSING }}\"\ngpu = \"T4\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
