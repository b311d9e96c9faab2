//! Environment variable allowlist and substitution for config file processing.
//!
//! Only allowlisted variables (and `TUTOR_CHAT_*` / `LC_*` prefixed ones) are
//! resolved, so a shared config file cannot pull secrets out of the
//! environment via `${SECRET_KEY}`.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `${VAR_NAME}` or `${VAR_NAME:-default_value}`.
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-((?:[^}\\]|\\.)*))?}")
        .expect("env-var substitution regex is a compile-time constant and must be valid")
});

/// Environment variables that are safe to substitute in config files.
pub const ALLOWED_ENV_VARS: &[&str] = &[
    // User / home
    "HOME",
    "USER",
    "USERNAME",
    "LOGNAME",
    "USERPROFILE", // Windows
    // XDG directories
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "XDG_STATE_HOME",
    "XDG_CACHE_HOME",
    // System paths
    "TMPDIR",
    "TEMP",
    "TMP",
    // Host
    "HOSTNAME",
    "HOST",
];

/// Check whether a variable name is on the substitution allowlist.
///
/// A variable is allowed if it appears in [`ALLOWED_ENV_VARS`], starts with
/// `TUTOR_CHAT_`, or starts with `LC_`.
pub fn is_env_var_allowed(var_name: &str) -> bool {
    ALLOWED_ENV_VARS.contains(&var_name)
        || var_name.starts_with("TUTOR_CHAT_")
        || var_name.starts_with("LC_")
}

/// Substitute `${VAR_NAME}` patterns in a string with environment variable values.
///
/// - `${VAR}` is replaced with the value of `VAR`; unset variables leave the
///   placeholder unchanged.
/// - `${VAR:-default}` falls back to `default` when `VAR` is unset.
/// - `$${VAR}` is an escape and produces the literal `${VAR}`.
/// - Non-allowlisted variables are left as-is and a warning is logged.
pub fn substitute_variables(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Substitution against an arbitrary variable lookup.
pub(crate) fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let escaped_placeholder = "\x00ESC_DOLLAR\x00";
    let working = input.replace("$${", escaped_placeholder);

    let result = ENV_VAR_PATTERN.replace_all(&working, |caps: &regex::Captures| {
        let var_name = &caps[1];

        if !is_env_var_allowed(var_name) {
            log::warn!("Config references non-allowlisted environment variable ${{{var_name}}}; skipped");
            return caps[0].to_string();
        }

        match lookup(var_name) {
            Some(val) => val,
            None => caps
                .get(2)
                .map(|m| m.as_str().replace("\\}", "}"))
                .unwrap_or_else(|| caps[0].to_string()),
        }
    });

    result.replace(escaped_placeholder, "${")
}
