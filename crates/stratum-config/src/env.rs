use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `{{ env.NAME }}` with an optional `| default("value")` suffix
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).expect("must be valid regex")
});

/// Expand `{{ env.VAR }}` placeholders in raw configuration text
///
/// Runs before TOML parsing so config structs only ever see plain strings.
/// Comment lines are left untouched.
pub fn expand_env(input: &str) -> Result<String, String> {
    input.split_inclusive('\n').map(expand_line).collect()
}

fn expand_line(line: &str) -> Result<String, String> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_owned());
    }

    let mut failure = None;
    let expanded = PLACEHOLDER.replace_all(line, |caps: &Captures<'_>| {
        let fallback = caps.get(2).map(|m| m.as_str());
        resolve(&caps[1], fallback).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            String::new()
        })
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "model_id = \"test-model\"\nstreaming = false\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_variables() {
        let vars = [("STRATUM_REGION", Some("eu-west-1")), ("STRATUM_KEY", Some("AKIA"))];
        temp_env::with_vars(vars, || {
            let result = expand_env("region = \"{{ env.STRATUM_REGION }}\"\nkey = \"{{env.STRATUM_KEY}}\"").unwrap();
            assert_eq!(result, "region = \"eu-west-1\"\nkey = \"AKIA\"");
        });
    }

    #[test]
    fn falls_back_to_default() {
        temp_env::with_var_unset("STRATUM_UNSET", || {
            let result = expand_env(r#"region = "{{ env.STRATUM_UNSET | default("us-east-1") }}""#).unwrap();
            assert_eq!(result, r#"region = "us-east-1""#);
        });
    }

    #[test]
    fn set_variable_wins_over_default() {
        temp_env::with_var("STRATUM_SET", Some("ap-south-1"), || {
            let result = expand_env(r#"region = "{{ env.STRATUM_SET | default("us-east-1") }}""#).unwrap();
            assert_eq!(result, r#"region = "ap-south-1""#);
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("STRATUM_MISSING", || {
            let err = expand_env("key = \"{{ env.STRATUM_MISSING }}\"").unwrap_err();
            assert!(err.contains("STRATUM_MISSING"));
        });
    }

    #[test]
    fn rejects_other_scopes() {
        let err = expand_env("key = \"{{ secrets.TOKEN }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comments_are_not_expanded() {
        temp_env::with_var_unset("STRATUM_MISSING", || {
            let input = "  # key = \"{{ env.STRATUM_MISSING }}\"\n";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
