//! The fully merged and substituted configuration.

use std::collections::BTreeMap;

use launcher_common::constants::KNOWN_SECRETS;
use launcher_common::error::{LauncherError, Result};
use launcher_common::types::{LinkDefinition, VolumeBinding};
use serde::Serialize;
use serde_yaml::Value;

use crate::merge::HookStep;
use crate::render::hostname;

/// Result of one composition run.
///
/// Values always carry a non-empty base image; the engine only hands out
/// configurations whose hook splice targets all resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub(crate) name: String,
    pub(crate) base_image: String,
    pub(crate) run_image: Option<String>,
    pub(crate) boot_command: Option<String>,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) labels: BTreeMap<String, String>,
    pub(crate) volumes: Vec<VolumeBinding>,
    pub(crate) links: Vec<LinkDefinition>,
    pub(crate) expose: Vec<String>,
    pub(crate) hooks: BTreeMap<String, Vec<HookStep>>,
    pub(crate) docker_args: Vec<String>,
    pub(crate) params: BTreeMap<String, String>,
    pub(crate) extra: BTreeMap<String, Value>,
}

impl ResolvedConfig {
    /// Creates an otherwise empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::MissingBaseImage`] if `base_image` is empty.
    pub fn new(name: impl Into<String>, base_image: impl Into<String>) -> Result<Self> {
        let base_image = base_image.into();
        if base_image.is_empty() {
            return Err(LauncherError::MissingBaseImage);
        }
        Ok(Self {
            name: name.into(),
            base_image,
            run_image: None,
            boot_command: None,
            env: BTreeMap::new(),
            labels: BTreeMap::new(),
            volumes: Vec::new(),
            links: Vec::new(),
            expose: Vec::new(),
            hooks: BTreeMap::new(),
            docker_args: Vec::new(),
            params: BTreeMap::new(),
            extra: BTreeMap::new(),
        })
    }

    /// Config name, used for container and image names.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image the application image is built from.
    #[must_use]
    pub fn base_image(&self) -> &str {
        &self.base_image
    }

    /// Image a container is launched from: the run image, else the base image.
    #[must_use]
    pub fn run_image(&self) -> &str {
        self.run_image.as_deref().unwrap_or(&self.base_image)
    }

    /// Boot command, or an empty string when suppressed.
    #[must_use]
    pub fn boot_command(&self) -> &str {
        self.boot_command.as_deref().unwrap_or_default()
    }

    /// Environment, keys unique.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Labels.
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Volume bindings, in layer order.
    #[must_use]
    pub fn volumes(&self) -> &[VolumeBinding] {
        &self.volumes
    }

    /// Links, in layer order.
    #[must_use]
    pub fn links(&self) -> &[LinkDefinition] {
        &self.links
    }

    /// Exposed ports, in layer order.
    #[must_use]
    pub fn expose(&self) -> &[String] {
        &self.expose
    }

    /// Spliced steps per hook.
    #[must_use]
    pub const fn hooks(&self) -> &BTreeMap<String, Vec<HookStep>> {
        &self.hooks
    }

    /// Raw runtime flags.
    #[must_use]
    pub fn docker_args(&self) -> &[String] {
        &self.docker_args
    }

    /// Substitution parameters, passed on to the initialization tool.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Pass-through keys, untouched.
    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Sorted `KEY=VALUE` pairs, optionally dropping known secrets.
    #[must_use]
    pub fn env_pairs(&self, include_secrets: bool) -> Vec<String> {
        self.env
            .iter()
            .filter(|(key, _)| include_secrets || !KNOWN_SECRETS.contains(&key.as_str()))
            .map(|(key, value)| format!("{key}={value}"))
            .collect()
    }

    /// Sanitized container hostname; see [`hostname::docker_hostname`].
    #[must_use]
    pub fn docker_hostname(&self, default_hostname: &str) -> String {
        hostname::docker_hostname(&self.env, default_hostname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResolvedConfig {
        let mut env = BTreeMap::new();
        let _ = env.insert("LANG".into(), "en_US.UTF-8".into());
        let _ = env.insert("DISCOURSE_DB_PASSWORD".into(), "hunter2".into());
        let _ = env.insert("A".into(), "1".into());
        let mut config = ResolvedConfig::new("app", "discourse/base:2.0").expect("config");
        config.env = env;
        config
    }

    #[test]
    fn new_rejects_empty_base_image() {
        let err = ResolvedConfig::new("app", "").unwrap_err();
        assert!(matches!(err, LauncherError::MissingBaseImage));
        assert_eq!(ResolvedConfig::new("app", "img").expect("config").base_image(), "img");
    }

    #[test]
    fn run_image_falls_back_to_base() {
        let mut config = config();
        assert_eq!(config.run_image(), "discourse/base:2.0");
        config.run_image = Some("custom/run:1".into());
        assert_eq!(config.run_image(), "custom/run:1");
    }

    #[test]
    fn boot_command_empty_when_suppressed() {
        let mut config = config();
        assert_eq!(config.boot_command(), "");
        config.boot_command = Some("/sbin/boot".into());
        assert_eq!(config.boot_command(), "/sbin/boot");
    }

    #[test]
    fn env_pairs_sorted_and_filter_secrets() {
        let config = config();
        assert_eq!(
            config.env_pairs(true),
            vec!["A=1", "DISCOURSE_DB_PASSWORD=hunter2", "LANG=en_US.UTF-8"]
        );
        assert_eq!(config.env_pairs(false), vec!["A=1", "LANG=en_US.UTF-8"]);
    }
}
