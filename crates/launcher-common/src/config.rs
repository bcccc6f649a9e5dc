//! Launcher settings shared by the CLI and library callers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Where documents live and how built images are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherSettings {
    /// Directory holding root configuration documents.
    pub conf_dir: PathBuf,
    /// Directory template references are resolved against.
    pub templates_dir: PathBuf,
    /// Directory used for image builds; a temporary one when unset.
    pub build_dir: Option<PathBuf>,
    /// Image namespace for built images.
    pub namespace: String,
}

impl LauncherSettings {
    /// Returns the image reference `<namespace>/<name>:<tag>`.
    ///
    /// An empty tag falls back to the default tag.
    #[must_use]
    pub fn image_reference(&self, name: &str, tag: &str) -> String {
        let tag = if tag.is_empty() {
            constants::DEFAULT_IMAGE_TAG
        } else {
            tag
        };
        format!("{}/{name}:{tag}", self.namespace)
    }
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from(constants::DEFAULT_CONF_DIR),
            templates_dir: PathBuf::from(constants::DEFAULT_TEMPLATES_DIR),
            build_dir: None,
            namespace: constants::DEFAULT_NAMESPACE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let settings = LauncherSettings::default();
        assert_eq!(settings.conf_dir, PathBuf::from("./containers"));
        assert_eq!(settings.templates_dir, PathBuf::from("."));
        assert_eq!(settings.namespace, "local_discourse");
        assert!(settings.build_dir.is_none());
    }

    #[test]
    fn image_reference_defaults_empty_tag() {
        let settings = LauncherSettings::default();
        assert_eq!(
            settings.image_reference("app", ""),
            "local_discourse/app:latest"
        );
        assert_eq!(
            settings.image_reference("app", "v2"),
            "local_discourse/app:v2"
        );
    }

    #[test]
    fn settings_serialization_roundtrip() {
        let settings = LauncherSettings {
            build_dir: Some(PathBuf::from("/tmp/build")),
            ..LauncherSettings::default()
        };
        let json = serde_json::to_string(&settings).expect("serialize");
        let back: LauncherSettings = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, settings);
    }
}
