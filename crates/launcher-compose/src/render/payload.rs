//! Initialization payload rendering.

use std::collections::BTreeMap;

use launcher_common::error::Result;
use serde::Serialize;
use serde_yaml::Value;

use crate::resolved::ResolvedConfig;

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: &'a BTreeMap<String, String>,
    env: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    hooks: BTreeMap<&'a str, Vec<&'a Value>>,
    #[serde(flatten)]
    extra: &'a BTreeMap<String, Value>,
}

/// Renders the YAML document consumed by the in-container initialization tool.
///
/// Hooks are emitted as plain step lists with keys stripped; pass-through
/// fields are written back verbatim.
///
/// # Errors
///
/// Returns [`launcher_common::error::LauncherError::Serialization`] if YAML
/// encoding fails.
pub fn render_payload(config: &ResolvedConfig) -> Result<String> {
    let hooks: BTreeMap<&str, Vec<&Value>> = config
        .hooks
        .iter()
        .map(|(hook, steps)| (hook.as_str(), steps.iter().map(|s| &s.body).collect()))
        .collect();
    let payload = Payload {
        params: &config.params,
        env: &config.env,
        hooks,
        extra: &config.extra,
    };
    Ok(serde_yaml::to_string(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::HookStep;

    fn config() -> ResolvedConfig {
        let mut config = ResolvedConfig::new("app", "discourse/base:2.0").expect("config");
        let _ = config.env.insert("LANG".into(), "en_US.UTF-8".into());
        let _ = config
            .extra
            .insert("version".into(), Value::String("tests-passed".into()));
        config
    }

    #[test]
    fn payload_keeps_pass_through_fields() {
        let text = render_payload(&config()).expect("render");
        assert!(text.contains("version: tests-passed"), "got:\n{text}");
        assert!(text.contains("LANG: en_US.UTF-8"), "got:\n{text}");
        assert!(!text.contains("params"), "got:\n{text}");
    }

    #[test]
    fn payload_hooks_drop_step_keys() {
        let mut config = config();
        let _ = config.hooks.insert(
            "after_code".into(),
            vec![
                HookStep {
                    key: Some("clone".into()),
                    body: serde_yaml::from_str("exec: git clone x").expect("yaml"),
                },
                HookStep {
                    key: None,
                    body: Value::String("echo done".into()),
                },
            ],
        );
        let text = render_payload(&config).expect("render");
        let parsed: Value = serde_yaml::from_str(&text).expect("reparse");
        let steps = parsed["hooks"]["after_code"]
            .as_sequence()
            .expect("step list");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["exec"], Value::String("git clone x".into()));
        assert!(!text.contains("clone\n"), "got:\n{text}");
    }

    #[test]
    fn payload_is_deterministic() {
        let config = config();
        assert_eq!(
            render_payload(&config).expect("render"),
            render_payload(&config).expect("render")
        );
    }
}
