//! Folding ordered layers into one configuration.
//!
//! Per-field policy, applied layer by layer (later layers win):
//!
//! | field | policy |
//! |---|---|
//! | base/run image, boot command | last non-empty value |
//! | `no_boot_command` | last value set |
//! | env, labels, params, pass-through keys | shallow union, later key overwrites |
//! | volumes, links, expose, docker args | concatenation, duplicates kept |
//! | hooks | ordered splice, see [`Merger::apply`] |

use std::collections::{BTreeMap, HashSet};

use launcher_common::error::{LauncherError, Result};
use launcher_common::types::{HookAction, LinkDefinition, VolumeBinding};
use serde::Serialize;
use serde_yaml::Value;

use crate::include::LayerEntry;
use crate::layer::{EnvValue, HookOp, Layer};

/// One step of a hook, optionally addressable by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookStep {
    /// Key later layers can splice around.
    pub key: Option<String>,
    /// Body handed to the initialization tool.
    pub body: Value,
}

/// Merged but not yet substituted configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    /// Config name.
    pub name: String,
    /// Base image, if any layer set one.
    pub base_image: Option<String>,
    /// Launch image override.
    pub run_image: Option<String>,
    /// Boot command, if any layer set one.
    pub boot_command: Option<String>,
    /// Whether the boot command is suppressed.
    pub no_boot_command: bool,
    /// Raw runtime flags.
    pub docker_args: Vec<String>,
    /// Exposed ports.
    pub expose: Vec<String>,
    /// Substitution parameters.
    pub params: BTreeMap<String, String>,
    /// Raw environment values.
    pub env: BTreeMap<String, EnvValue>,
    /// Labels.
    pub labels: BTreeMap<String, String>,
    /// Volume bindings.
    pub volumes: Vec<VolumeBinding>,
    /// Links.
    pub links: Vec<LinkDefinition>,
    /// Spliced steps per hook.
    pub hooks: BTreeMap<String, Vec<HookStep>>,
    /// Pass-through keys.
    pub extra: BTreeMap<String, Value>,
}

/// Applies layers one at a time onto an accumulating configuration.
#[derive(Debug)]
pub struct Merger {
    merged: MergedConfig,
}

impl Merger {
    /// Starts an empty merge for the config called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            merged: MergedConfig {
                name: name.into(),
                ..MergedConfig::default()
            },
        }
    }

    /// Applies one layer on top of everything applied so far.
    ///
    /// Hook operations run in document order. `append` adds to the end,
    /// `replace` drops steps contributed by earlier layers (several replaces
    /// of one hook within a layer accumulate), and the insert actions splice
    /// next to the step whose key matches the target. Only steps already
    /// present can be targeted.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::HookTargetNotFound`] if a splice target is
    /// absent.
    pub fn apply(&mut self, layer: &Layer) -> Result<()> {
        let merged = &mut self.merged;

        overlay(&mut merged.base_image, layer.base_image.as_ref());
        overlay(&mut merged.run_image, layer.run_image.as_ref());
        overlay(&mut merged.boot_command, layer.boot_command.as_ref());
        if let Some(no_boot) = layer.no_boot_command {
            merged.no_boot_command = no_boot;
        }

        merged.params.extend(layer.params.clone());
        merged.env.extend(layer.env.clone());
        merged.labels.extend(layer.labels.clone());
        merged.extra.extend(layer.extra.clone());

        merged.docker_args.extend_from_slice(&layer.docker_args);
        merged.expose.extend_from_slice(&layer.expose);
        merged.volumes.extend_from_slice(&layer.volumes);
        merged.links.extend_from_slice(&layer.links);

        let mut replaced = HashSet::new();
        for op in &layer.hooks {
            apply_hook(&mut merged.hooks, op, &mut replaced)?;
        }
        Ok(())
    }

    /// Returns the accumulated configuration.
    #[must_use]
    pub fn finish(self) -> MergedConfig {
        self.merged
    }
}

/// Merges `layers` in order into one configuration named `name`.
///
/// # Errors
///
/// Returns the first hook splice failure.
pub fn merge_layers(name: &str, layers: &[LayerEntry]) -> Result<MergedConfig> {
    tracing::info!(config = name, layers = layers.len(), "merging layers");
    let mut merger = Merger::new(name);
    for entry in layers {
        tracing::debug!(layer = %entry.reference, "applying layer");
        merger.apply(&entry.layer)?;
    }
    Ok(merger.finish())
}

fn overlay(slot: &mut Option<String>, value: Option<&String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = Some(value.clone());
    }
}

fn apply_hook<'op>(
    hooks: &mut BTreeMap<String, Vec<HookStep>>,
    op: &'op HookOp,
    replaced: &mut HashSet<&'op str>,
) -> Result<()> {
    tracing::debug!(hook = %op.hook, action = %op.action, key = ?op.key, "hook operation");
    let step = HookStep {
        key: op.key.clone(),
        body: op.step.clone(),
    };

    match op.action {
        HookAction::Append => hooks.entry(op.hook.clone()).or_default().push(step),
        HookAction::Replace => {
            let steps = hooks.entry(op.hook.clone()).or_default();
            if replaced.insert(op.hook.as_str()) {
                steps.clear();
            }
            steps.push(step);
        }
        HookAction::InsertBefore | HookAction::InsertAfter => {
            let target = op.target.as_deref().unwrap_or_default();
            let not_found = || LauncherError::HookTargetNotFound {
                hook: op.hook.clone(),
                target: target.to_owned(),
            };
            let steps = hooks.get_mut(&op.hook).ok_or_else(not_found)?;
            let position = steps
                .iter()
                .position(|s| s.key.as_deref() == Some(target))
                .ok_or_else(not_found)?;
            let at = if op.action == HookAction::InsertBefore {
                position
            } else {
                position + 1
            };
            steps.insert(at, step);
        }
    }
    Ok(())
}
