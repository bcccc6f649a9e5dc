//! Launch flag rendering.
//!
//! Flags are emitted in a fixed order: environment, labels, ports, volumes,
//! links, shared memory, removal, restart policy, detach, interactive, raw
//! runtime flags, hostname, name, image and finally the command. Raw flags
//! come after everything generated so that they take precedence.

use launcher_common::constants::SHM_SIZE_FLAG;

use crate::resolved::ResolvedConfig;

/// How environment values reach the container runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Bare `--env KEY` flags; values come from the runtime's inherited
    /// process environment.
    #[default]
    Execute,
    /// `--env KEY=value` flags with shell-escaped values, for printing.
    /// Multi-line values are left out.
    Preview,
}

/// Caller-supplied knobs for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    mode: RenderMode,
    remove: bool,
    restart: bool,
    detach: bool,
    skip_ports: bool,
    extra_env: Vec<String>,
    extra_flags: Vec<String>,
    hostname: Option<String>,
    name: Option<String>,
    image: Option<String>,
    command: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchOptions {
    /// Execution mode, restart always, nothing else set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: RenderMode::Execute,
            remove: false,
            restart: true,
            detach: false,
            skip_ports: false,
            extra_env: Vec::new(),
            extra_flags: Vec::new(),
            hostname: None,
            name: None,
            image: None,
            command: Vec::new(),
        }
    }

    /// Sets the render mode.
    #[must_use]
    pub const fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Removes the container when it exits.
    #[must_use]
    pub const fn remove(mut self, remove: bool) -> Self {
        self.remove = remove;
        self
    }

    /// `--restart=always` when set, `--restart=no` otherwise.
    #[must_use]
    pub const fn restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }

    /// Runs the container in the background.
    #[must_use]
    pub const fn detach(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }

    /// Leaves out publish and expose flags.
    #[must_use]
    pub const fn skip_ports(mut self, skip: bool) -> Self {
        self.skip_ports = skip;
        self
    }

    /// Adds an `--env` entry after the configuration's own environment.
    #[must_use]
    pub fn extra_env(mut self, entry: impl Into<String>) -> Self {
        self.extra_env.push(entry.into());
        self
    }

    /// Appends raw flags after the configuration's runtime flags.
    #[must_use]
    pub fn extra_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Sets the container hostname; empty names are ignored.
    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into()).filter(|h| !h.is_empty());
        self
    }

    /// Sets the container name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the launch image.
    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the command arguments following the image.
    #[must_use]
    pub fn command<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = args.into_iter().map(Into::into).collect();
        self
    }

    /// Render mode in effect.
    #[must_use]
    pub const fn render_mode(&self) -> RenderMode {
        self.mode
    }
}

/// Renders the full argument list following `docker run`.
#[must_use]
pub fn render_launch_flags(config: &ResolvedConfig, options: &LaunchOptions) -> Vec<String> {
    let mut flags = Vec::new();

    for (key, value) in &config.env {
        match options.mode {
            RenderMode::Execute => push(&mut flags, "--env", key.clone()),
            RenderMode::Preview if value.contains('\n') => {
                tracing::debug!(key = %key, "omitting multi-line env value from preview");
            }
            RenderMode::Preview => {
                push(&mut flags, "--env", format!("{key}={}", shell_escape(value)));
            }
        }
    }
    for entry in &options.extra_env {
        push(&mut flags, "--env", entry.clone());
    }
    for (key, value) in &config.labels {
        push(&mut flags, "--label", format!("{key}={value}"));
    }
    if !options.skip_ports {
        for port in &config.expose {
            let flag = if port.contains(':') { "--publish" } else { "--expose" };
            push(&mut flags, flag, port.clone());
        }
    }
    for volume in &config.volumes {
        push(&mut flags, "--volume", volume.to_string());
    }
    for link in &config.links {
        push(&mut flags, "--link", link.to_string());
    }

    flags.push(SHM_SIZE_FLAG.to_owned());
    if options.remove {
        flags.push("--rm".to_owned());
    }
    let restart = if options.restart { "always" } else { "no" };
    flags.push(format!("--restart={restart}"));
    if options.detach {
        flags.push("--detach".to_owned());
    }
    flags.push("--interactive".to_owned());

    flags.extend(config.docker_args.iter().cloned());
    flags.extend(options.extra_flags.iter().cloned());

    if let Some(hostname) = &options.hostname {
        push(&mut flags, "--hostname", hostname.clone());
    }
    if let Some(name) = &options.name {
        push(&mut flags, "--name", name.clone());
    }
    let image = options.image.as_deref().unwrap_or_else(|| config.run_image());
    flags.push(image.to_owned());
    flags.extend(options.command.iter().cloned());
    flags
}

/// Quotes `value` for a POSIX shell unless it is made only of safe characters.
#[must_use]
pub fn shell_escape(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if safe {
        value.to_owned()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

fn push(flags: &mut Vec<String>, flag: &str, value: String) {
    flags.push(flag.to_owned());
    flags.push(value);
}
