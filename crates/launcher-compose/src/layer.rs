//! Layer documents: one parsed root config or template.
//!
//! Every field is optional. Scalars are accepted wherever a string is
//! expected, and an empty (`null`) collection is the same as an absent one.
//! Keys the schema does not know are kept as pass-through fields.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use launcher_common::types::{HookAction, LinkDefinition, VolumeBinding};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// One parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Layer {
    /// Image the application image is built from.
    #[serde(default, deserialize_with = "scalar::optional")]
    pub base_image: Option<String>,
    /// Image used to launch the container instead of the base image.
    #[serde(default, deserialize_with = "scalar::optional")]
    pub run_image: Option<String>,
    /// Command the container boots with.
    #[serde(default, deserialize_with = "scalar::optional")]
    pub boot_command: Option<String>,
    /// Suppresses the boot command entirely.
    #[serde(default)]
    pub no_boot_command: Option<bool>,
    /// Raw runtime flags, appended after every generated flag.
    #[serde(default, deserialize_with = "scalar::flags")]
    pub docker_args: Vec<String>,
    /// Templates included before this layer's own fields.
    #[serde(default, deserialize_with = "scalar::list")]
    pub templates: Vec<String>,
    /// Exposed ports, either `port` or `host:container`.
    #[serde(default, deserialize_with = "scalar::list")]
    pub expose: Vec<String>,
    /// Substitution parameters.
    #[serde(default, deserialize_with = "scalar::map")]
    pub params: BTreeMap<String, String>,
    /// Environment variables, plain or file-backed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub env: BTreeMap<String, EnvValue>,
    /// Container labels.
    #[serde(default, deserialize_with = "scalar::map")]
    pub labels: BTreeMap<String, String>,
    /// Host directories bound into the container.
    #[serde(default, deserialize_with = "entries::volumes")]
    pub volumes: Vec<VolumeBinding>,
    /// Links to other containers.
    #[serde(default, deserialize_with = "entries::links")]
    pub links: Vec<LinkDefinition>,
    /// Hook operations, in document order.
    #[serde(default, deserialize_with = "hooks::operations")]
    pub hooks: Vec<HookOp>,
    /// Any other top-level key, carried through to the payload untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Layer {
    /// Resolves relative file references in environment values against `dir`.
    pub fn anchor_paths(&mut self, dir: &Path) {
        for value in self.env.values_mut() {
            if let EnvValue::Files(paths) = value {
                for path in paths.iter_mut() {
                    if path.is_relative() {
                        *path = dir.join(&*path);
                    }
                }
            }
        }
    }
}

/// Raw environment value as written in a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum EnvValue {
    /// A literal value.
    Plain(String),
    /// Contents of one or more files, joined in reference order.
    Files(Vec<PathBuf>),
}

impl TryFrom<Value> for EnvValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Mapping(map) = value else {
            return scalar::to_string(value).map(Self::Plain);
        };
        if map.len() != 1 {
            return Err("file-backed env values take exactly one of `file` or `files`".into());
        }
        if let Some(file) = map.get("file") {
            let path = scalar::to_string(file.clone())?;
            return Ok(Self::Files(vec![PathBuf::from(path)]));
        }
        match map.get("files") {
            Some(Value::Sequence(files)) if !files.is_empty() => files
                .iter()
                .map(|f| scalar::to_string(f.clone()).map(PathBuf::from))
                .collect::<Result<_, _>>()
                .map(Self::Files),
            Some(_) => Err("`files` must be a non-empty list of paths".into()),
            None => Err("file-backed env values take exactly one of `file` or `files`".into()),
        }
    }
}

/// One operation against a named hook.
#[derive(Debug, Clone, PartialEq)]
pub struct HookOp {
    /// Hook the operation applies to.
    pub hook: String,
    /// How the step list is modified.
    pub action: HookAction,
    /// Key identifying the new step, so later layers can splice around it.
    pub key: Option<String>,
    /// Key of the step a splice is positioned against.
    pub target: Option<String>,
    /// Step body handed to the initialization tool.
    pub step: Value,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod scalar {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_yaml::Value;

    /// Textual form of a YAML scalar.
    pub fn to_string(value: Value) -> Result<String, String> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) => Ok(s),
            Value::Tagged(tagged) => to_string(tagged.value),
            Value::Sequence(_) | Value::Mapping(_) => Err("expected a scalar value".into()),
        }
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => to_string(value).map(Some).map_err(D::Error::custom),
        }
    }

    pub fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Vec<Value>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|v| to_string(v).map_err(D::Error::custom))
            .collect()
    }

    pub fn map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<BTreeMap<String, Value>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| to_string(v).map(|v| (k, v)).map_err(D::Error::custom))
            .collect()
    }

    /// Accepts a whitespace-separated string or a list of flags.
    pub fn flags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(s.split_whitespace().map(String::from).collect()),
            Some(Value::Sequence(items)) => items
                .into_iter()
                .map(|v| to_string(v).map_err(D::Error::custom))
                .collect(),
            Some(_) => Err(D::Error::custom(
                "docker_args must be a string or a list of strings",
            )),
        }
    }
}

mod entries {
    use launcher_common::types::{LinkDefinition, VolumeBinding};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    struct VolumeEntry {
        volume: VolumeBinding,
    }

    #[derive(Deserialize)]
    struct LinkEntry {
        link: LinkDefinition,
    }

    pub fn volumes<'de, D>(deserializer: D) -> Result<Vec<VolumeBinding>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Vec<VolumeEntry>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.volume)
            .collect())
    }

    pub fn links<'de, D>(deserializer: D) -> Result<Vec<LinkDefinition>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Vec<LinkEntry>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.link)
            .collect())
    }
}

mod hooks {
    use launcher_common::types::HookAction;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_yaml::{Mapping, Value};

    use super::{HookOp, scalar};

    const OPERATION_FIELDS: [&str; 3] = ["action", "key", "target"];

    pub fn operations<'de, D>(deserializer: D) -> Result<Vec<HookOp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(hooks) = Option::<Mapping>::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        let mut ops = Vec::new();
        for (name, entries) in hooks {
            let hook = scalar::to_string(name).map_err(D::Error::custom)?;
            let entries = match entries {
                Value::Null => continue,
                Value::Sequence(entries) => entries,
                _ => {
                    return Err(D::Error::custom(format!(
                        "hook `{hook}` must be a list of steps"
                    )));
                }
            };
            for entry in entries {
                ops.push(parse_entry(&hook, entry).map_err(D::Error::custom)?);
            }
        }
        Ok(ops)
    }

    fn parse_entry(hook: &str, entry: Value) -> Result<HookOp, String> {
        let Value::Mapping(mut fields) = entry else {
            return Ok(shorthand(hook, entry));
        };
        let Some(step) = fields.remove("step") else {
            if let Some(field) = OPERATION_FIELDS.iter().find(|f| fields.contains_key(**f)) {
                return Err(format!("hook `{hook}`: `{field}` requires a `step`"));
            }
            return Ok(shorthand(hook, Value::Mapping(fields)));
        };

        let action = match fields.remove("action") {
            Some(action) => serde_yaml::from_value::<HookAction>(action)
                .map_err(|e| format!("hook `{hook}`: {e}"))?,
            None => HookAction::default(),
        };
        let key = optional_field(&mut fields, "key")?;
        let target = optional_field(&mut fields, "target")?;
        if let Some(unknown) = fields.keys().next() {
            return Err(format!("hook `{hook}`: unknown operation field {unknown:?}"));
        }
        if action.is_splice() && target.is_none() {
            return Err(format!("hook `{hook}`: {action} requires a `target` step key"));
        }

        Ok(HookOp {
            hook: hook.to_owned(),
            action,
            key,
            target,
            step,
        })
    }

    fn shorthand(hook: &str, step: Value) -> HookOp {
        HookOp {
            hook: hook.to_owned(),
            action: HookAction::Append,
            key: None,
            target: None,
            step,
        }
    }

    fn optional_field(fields: &mut Mapping, name: &str) -> Result<Option<String>, String> {
        fields
            .remove(name)
            .map(scalar::to_string)
            .transpose()
            .map(|v| v.filter(|s| !s.is_empty()))
    }
}
