//! `${ENV_VAR}` substitution over raw config text.

/// Result of substituting placeholders in one config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituted {
    pub text: String,
    /// Placeholders that had no value, in order of appearance.
    pub unresolved: Vec<String>,
}

/// Replace `${ENV_VAR}` placeholders with values from the process
/// environment.
///
/// Unresolvable variables are left as written and reported in
/// [`Substituted::unresolved`].
pub fn substitute_env(input: &str) -> Substituted {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with a caller-supplied lookup, so tests do not
/// have to mutate the process environment.
pub fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> Substituted {
    let mut text = String::with_capacity(input.len());
    let mut unresolved = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        text.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated, emit as written.
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let name = &after[..end];
        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => text.push_str(&value),
            None => {
                text.push_str(&rest[start..start + 2 + end + 1]);
                if !name.is_empty() {
                    unresolved.push(name.to_string());
                }
            },
        }
        rest = &after[end + 1..];
    }
    text.push_str(rest);

    Substituted { text, unresolved }
}
