//! Image build recipe rendering.

use std::fmt::Write as _;

use launcher_common::constants::{IMAGE_PAYLOAD_PATH, PAYLOAD_FILE_NAME, PUPS_PATH};

use crate::resolved::ResolvedConfig;

/// Knobs for [`render_dockerfile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeOptions {
    pups_args: String,
    bake_env: bool,
}

impl RecipeOptions {
    /// Creates the default options: no extra tool arguments, no baked env.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra arguments for the initialization tool.
    #[must_use]
    pub fn pups_args(mut self, args: impl Into<String>) -> Self {
        self.pups_args = args.into();
        self
    }

    /// Emits `ENV KEY=${KEY}` for every build argument.
    #[must_use]
    pub const fn bake_env(mut self, bake: bool) -> Self {
        self.bake_env = bake;
        self
    }
}

/// Renders the build recipe for `config`.
///
/// The recipe is rooted at the base image, declares one build argument per
/// environment key, exposes each port and runs the initialization tool on
/// the payload copied from the build context.
#[must_use]
pub fn render_dockerfile(config: &ResolvedConfig, options: &RecipeOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ARG dockerfile_from_image={}", config.base_image);
    let _ = writeln!(out, "FROM ${{dockerfile_from_image}}");
    for key in config.env.keys() {
        let _ = writeln!(out, "ARG {key}");
    }
    if options.bake_env {
        for key in config.env.keys() {
            let _ = writeln!(out, "ENV {key}=${{{key}}}");
        }
    }
    for port in &config.expose {
        let _ = writeln!(out, "EXPOSE {}", container_port(port));
    }
    let _ = writeln!(out, "COPY {PAYLOAD_FILE_NAME} {IMAGE_PAYLOAD_PATH}");

    let args = options.pups_args.trim();
    let pups = if args.is_empty() {
        PUPS_PATH.to_owned()
    } else {
        format!("{PUPS_PATH} {args}")
    };
    let _ = writeln!(
        out,
        "RUN cat {IMAGE_PAYLOAD_PATH} | {pups} --stdin && rm {IMAGE_PAYLOAD_PATH}"
    );
    if let Some(boot) = config.boot_command.as_deref().filter(|b| !b.is_empty()) {
        let _ = writeln!(out, "CMD [\"{boot}\"]");
    }
    out
}

fn container_port(port: &str) -> &str {
    port.rsplit(':').next().unwrap_or(port)
}
