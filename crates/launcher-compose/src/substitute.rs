//! Parameter and file-backed value expansion.
//!
//! Parameter tokens look like `{{ name }}`. Every token must be bound;
//! an unexpanded token in a generated document would silently corrupt
//! downstream payloads. `$name` references are left alone for the
//! in-container initialization tool.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use launcher_common::constants::{DEFAULT_BOOT_COMMAND, FILE_SEPARATOR};
use launcher_common::error::{LauncherError, Result};
use launcher_common::types::{LinkDefinition, VolumeBinding};
use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::layer::EnvValue;
use crate::merge::{HookStep, MergedConfig};
use crate::resolved::ResolvedConfig;

#[allow(clippy::expect_used)]
static PARAM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("param token pattern is valid")
});

/// Expands parameter tokens and file-backed values.
#[derive(Debug)]
pub struct SubstitutionResolver<'a> {
    params: &'a BTreeMap<String, String>,
}

impl<'a> SubstitutionResolver<'a> {
    /// Creates a resolver binding tokens to `params`.
    #[must_use]
    pub const fn new(params: &'a BTreeMap<String, String>) -> Self {
        Self { params }
    }

    /// Replaces every token in `input`; `field` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::UndefinedParam`] for the first unbound token.
    pub fn expand(&self, input: &str, field: &str) -> Result<String> {
        let mut missing = None;
        let expanded = PARAM_TOKEN.replace_all(input, |caps: &Captures<'_>| {
            let name = &caps[1];
            self.params.get(name).cloned().unwrap_or_else(|| {
                let _ = missing.get_or_insert_with(|| name.to_owned());
                String::new()
            })
        });
        match missing {
            Some(param) => Err(LauncherError::UndefinedParam {
                param,
                field: field.to_owned(),
            }),
            None => Ok(expanded.into_owned()),
        }
    }

    /// Expands every string inside a YAML value; mapping keys are kept.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::UndefinedParam`] for the first unbound token.
    pub fn expand_value(&self, value: &Value, field: &str) -> Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(self.expand(s, field)?),
            Value::Sequence(items) => Value::Sequence(
                items
                    .iter()
                    .map(|item| self.expand_value(item, field))
                    .collect::<Result<_>>()?,
            ),
            Value::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.expand_value(v, field)?)))
                    .collect::<Result<_>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Produces the final configuration from a merged one.
    ///
    /// Plain values are parameter-expanded; file-backed environment values are
    /// replaced by file contents joined with [`FILE_SEPARATOR`] and are not
    /// expanded further. Pass-through keys are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::UndefinedParam`] for unbound tokens,
    /// [`LauncherError::Io`] for unreadable env files, and
    /// [`LauncherError::MissingBaseImage`] if no base image remains.
    pub fn resolve(&self, merged: MergedConfig) -> Result<ResolvedConfig> {
        tracing::info!(config = %merged.name, params = self.params.len(), "substituting values");

        let base_image = merged
            .base_image
            .as_deref()
            .map(|image| self.expand(image, "base_image"))
            .transpose()?
            .unwrap_or_default();
        let run_image = merged
            .run_image
            .as_deref()
            .map(|image| self.expand(image, "run_image"))
            .transpose()?;
        let boot_command = if merged.no_boot_command {
            None
        } else {
            let command = merged.boot_command.as_deref().unwrap_or(DEFAULT_BOOT_COMMAND);
            Some(self.expand(command, "boot_command")?)
        };

        let env = merged
            .env
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.env_value(key, value)?)))
            .collect::<Result<_>>()?;
        let labels = merged
            .labels
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.expand(value, &format!("labels.{key}"))?)))
            .collect::<Result<_>>()?;
        let volumes = merged
            .volumes
            .iter()
            .map(|v| {
                Ok(VolumeBinding::new(
                    self.expand(&v.host, "volumes")?,
                    self.expand(&v.guest, "volumes")?,
                ))
            })
            .collect::<Result<_>>()?;
        let links = merged
            .links
            .iter()
            .map(|l| {
                Ok(LinkDefinition::new(
                    self.expand(&l.name, "links")?,
                    self.expand(&l.alias, "links")?,
                ))
            })
            .collect::<Result<_>>()?;
        let expose = self.expand_all(&merged.expose, "expose")?;
        let docker_args = self.expand_all(&merged.docker_args, "docker_args")?;
        let hooks = merged
            .hooks
            .iter()
            .map(|(hook, steps)| {
                let field = format!("hooks.{hook}");
                let steps = steps
                    .iter()
                    .map(|step| {
                        Ok(HookStep {
                            key: step.key.clone(),
                            body: self.expand_value(&step.body, &field)?,
                        })
                    })
                    .collect::<Result<_>>()?;
                Ok((hook.clone(), steps))
            })
            .collect::<Result<_>>()?;

        let mut config = ResolvedConfig::new(merged.name, base_image)?;
        config.run_image = run_image;
        config.boot_command = boot_command;
        config.env = env;
        config.labels = labels;
        config.volumes = volumes;
        config.links = links;
        config.expose = expose;
        config.hooks = hooks;
        config.docker_args = docker_args;
        config.params = merged.params;
        config.extra = merged.extra;
        Ok(config)
    }

    fn expand_all(&self, values: &[String], field: &str) -> Result<Vec<String>> {
        values.iter().map(|v| self.expand(v, field)).collect()
    }

    fn env_value(&self, key: &str, value: &EnvValue) -> Result<String> {
        match value {
            EnvValue::Plain(text) => self.expand(text, &format!("env.{key}")),
            EnvValue::Files(paths) => read_joined(key, paths),
        }
    }
}

fn read_joined(key: &str, paths: &[PathBuf]) -> Result<String> {
    tracing::debug!(key, files = paths.len(), "reading file-backed env value");
    let contents = paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).map_err(|e| LauncherError::Io {
                path: path.clone(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(contents.join(FILE_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn merged(base: Option<&str>) -> MergedConfig {
        MergedConfig {
            name: "app".into(),
            base_image: base.map(String::from),
            ..MergedConfig::default()
        }
    }

    #[test]
    fn expand_replaces_bound_tokens() {
        let p = params(&[("db", "discourse"), ("host", "pg")]);
        let resolver = SubstitutionResolver::new(&p);
        let out = resolver
            .expand("postgres://{{host}}/{{ db }}", "env.URL")
            .expect("expand");
        assert_eq!(out, "postgres://pg/discourse");
    }

    #[test]
    fn expand_leaves_dollar_references_alone() {
        let p = params(&[]);
        let resolver = SubstitutionResolver::new(&p);
        assert_eq!(resolver.expand("cd $home", "hooks").expect("expand"), "cd $home");
    }

    #[test]
    fn expand_unbound_token_fails() {
        let p = params(&[("a", "1")]);
        let resolver = SubstitutionResolver::new(&p);
        let err = resolver.expand("{{a}}-{{b}}", "env.X").unwrap_err();
        match err {
            LauncherError::UndefinedParam { param, field } => {
                assert_eq!(param, "b");
                assert_eq!(field, "env.X");
            }
            other => unreachable!("expected UndefinedParam, got {other}"),
        }
    }

    #[test]
    fn expand_value_walks_nested_strings() {
        let p = params(&[("dir", "/var/www")]);
        let resolver = SubstitutionResolver::new(&p);
        let value: Value =
            serde_yaml::from_str("exec:\n  cd: '{{dir}}'\n  cmd: ['ls {{dir}}', 3]\n").expect("yaml");
        let out = resolver.expand_value(&value, "hooks.x").expect("expand");
        let expected: Value =
            serde_yaml::from_str("exec:\n  cd: /var/www\n  cmd: ['ls /var/www', 3]\n").expect("yaml");
        assert_eq!(out, expected);
    }

    #[test]
    fn resolve_requires_base_image() {
        let p = params(&[]);
        let err = SubstitutionResolver::new(&p).resolve(merged(None)).unwrap_err();
        assert!(matches!(err, LauncherError::MissingBaseImage));
    }

    #[test]
    fn resolve_base_image_expanding_to_empty_fails() {
        let p = params(&[("image", "")]);
        let err = SubstitutionResolver::new(&p)
            .resolve(merged(Some("{{image}}")))
            .unwrap_err();
        assert!(matches!(err, LauncherError::MissingBaseImage));
    }

    #[test]
    fn resolve_defaults_boot_command() {
        let p = params(&[]);
        let config = SubstitutionResolver::new(&p)
            .resolve(merged(Some("img")))
            .expect("resolve");
        assert_eq!(config.boot_command.as_deref(), Some("/sbin/boot"));

        let mut suppressed = merged(Some("img"));
        suppressed.no_boot_command = true;
        let config = SubstitutionResolver::new(&p).resolve(suppressed).expect("resolve");
        assert!(config.boot_command.is_none());
    }

    #[test]
    fn resolve_joins_file_backed_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a.pem");
        let b = dir.path().join("b.pem");
        std::fs::write(&a, "AAA").expect("write");
        std::fs::write(&b, "BBB {{not_a_token}}").expect("write");

        let mut config = merged(Some("img"));
        let _ = config
            .env
            .insert("BUNDLE".into(), EnvValue::Files(vec![a, b]));
        let p = params(&[]);
        let resolved = SubstitutionResolver::new(&p).resolve(config).expect("resolve");
        assert_eq!(resolved.env["BUNDLE"], "AAA_FILE_SEPERATOR_BBB {{not_a_token}}");
    }

    #[test]
    fn resolve_missing_env_file_is_io_error() {
        let mut config = merged(Some("img"));
        let _ = config.env.insert(
            "CERT".into(),
            EnvValue::Files(vec![PathBuf::from("/nonexistent/launcher/cert.pem")]),
        );
        let p = params(&[]);
        let err = SubstitutionResolver::new(&p).resolve(config).unwrap_err();
        assert!(matches!(err, LauncherError::Io { .. }), "got: {err}");
    }

    #[test]
    fn resolve_leaves_pass_through_untouched() {
        let mut config = merged(Some("img"));
        let _ = config
            .extra
            .insert("version".into(), Value::String("{{unbound}}".into()));
        let p = params(&[]);
        let resolved = SubstitutionResolver::new(&p).resolve(config).expect("resolve");
        assert_eq!(resolved.extra["version"], Value::String("{{unbound}}".into()));
    }
}
