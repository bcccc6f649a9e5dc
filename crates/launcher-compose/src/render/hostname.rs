//! Container hostname selection and sanitization.

use std::collections::BTreeMap;

use launcher_common::constants::{HOSTNAME_KEY, USE_HOSTNAME_KEY};

/// Replaces every character outside `[A-Za-z0-9-]` with `-`.
///
/// Length (in characters), case and position are preserved, so sanitizing
/// twice gives the same result as sanitizing once.
#[must_use]
pub fn sanitize_hostname(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Picks the container hostname from `env`, falling back to `default_hostname`.
///
/// The configured `DISCOURSE_HOSTNAME` is used only when
/// `DOCKER_USE_HOSTNAME` is `true`, `1` or `yes`.
#[must_use]
pub fn docker_hostname(env: &BTreeMap<String, String>, default_hostname: &str) -> String {
    let use_configured = env
        .get(USE_HOSTNAME_KEY)
        .is_some_and(|flag| is_enabled(flag));
    let raw = if use_configured {
        env.get(HOSTNAME_KEY).map_or("", String::as_str)
    } else {
        default_hostname
    };
    tracing::debug!(use_configured, raw, "computing docker hostname");
    sanitize_hostname(raw)
}

fn is_enabled(flag: &str) -> bool {
    ["true", "1", "yes"]
        .iter()
        .any(|on| flag.trim().eq_ignore_ascii_case(on))
}
