//! `docker` invocations for building and launching application containers.

use std::path::{Path, PathBuf};

use launcher_common::constants::{PUPS_PATH, SHM_SIZE_FLAG};
use launcher_common::error::{LauncherError, Result};
use launcher_compose::ResolvedConfig;
use launcher_compose::render::{
    LaunchOptions, RecipeOptions, render_dockerfile, render_launch_flags, render_payload,
};

use crate::invocation::Invocation;

const DOCKER: &str = "docker";

/// Builds invocations of the docker command-line client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
    program: PathBuf,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DOCKER)
    }
}

impl DockerCli {
    /// Uses `program` as the docker executable.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Finds `docker` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Process`] if no executable is found.
    pub fn locate() -> Result<Self> {
        let program = which::which(DOCKER).map_err(|e| LauncherError::Process {
            program: DOCKER.into(),
            message: format!("docker executable not found on PATH: {e}"),
        })?;
        tracing::debug!(path = %program.display(), "located docker");
        Ok(Self::new(program))
    }

    /// Executable the invocations run.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Image build: the recipe is fed on stdin and `dir` is the build context.
    ///
    /// Only non-secret environment values are passed as build arguments.
    #[must_use]
    pub fn build(
        &self,
        config: &ResolvedConfig,
        image: &str,
        recipe: &RecipeOptions,
        dir: &Path,
    ) -> Invocation {
        let pairs = config.env_pairs(false);
        let build_args = pairs.iter().flat_map(|pair| {
            let key = pair.split_once('=').map_or(pair.as_str(), |(k, _)| k);
            ["--build-arg".to_owned(), key.to_owned()]
        });
        Invocation::new(&self.program)
            .arg("build")
            .args(build_args)
            .args(["--no-cache", "--pull", "--force-rm", "-t", image, SHM_SIZE_FLAG, "-f", "-", "."])
            .env_pairs(&pairs)
            .env("BUILDKIT_PROGRESS", "plain")
            .stdin(render_dockerfile(config, recipe))
            .dir(dir)
    }

    /// Container launch with the rendered flag sequence.
    #[must_use]
    pub fn run(&self, config: &ResolvedConfig, options: &LaunchOptions) -> Invocation {
        Invocation::new(&self.program)
            .arg("run")
            .args(render_launch_flags(config, options))
            .env_pairs(config.env_pairs(true))
    }

    /// One-off container running the initialization tool on the payload.
    ///
    /// Ports are never published; the payload is fed on stdin.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Serialization`] if the payload cannot be
    /// rendered.
    pub fn pups_run(
        &self,
        config: &ResolvedConfig,
        options: LaunchOptions,
        pups_args: &str,
    ) -> Result<Invocation> {
        let script = format!("{PUPS_PATH} --stdin {}", pups_args.trim());
        let options = options
            .skip_ports(true)
            .command(["/bin/bash", "-c", script.trim_end()]);
        Ok(self.run(config, &options).stdin(render_payload(config)?))
    }

    /// Saves a stopped container as `image`, booting with the config's command.
    #[must_use]
    pub fn commit(&self, config: &ResolvedConfig, container: &str, image: &str) -> Invocation {
        let mut invocation = Invocation::new(&self.program).arg("commit");
        let boot = config.boot_command();
        if !boot.is_empty() {
            invocation = invocation.args(["--change".to_owned(), format!("CMD [\"{boot}\"]")]);
        }
        invocation.args([container, image])
    }

    /// Forced removal of `container`.
    #[must_use]
    pub fn remove(&self, container: &str) -> Invocation {
        Invocation::new(&self.program).args(["rm", "--force", container])
    }

    /// Lists ids of containers, running or not, whose name matches `container`.
    ///
    /// Empty output means no such container.
    #[must_use]
    pub fn find(&self, container: &str) -> Invocation {
        Invocation::new(&self.program).args([
            "ps".to_owned(),
            "--all".to_owned(),
            "--quiet".to_owned(),
            "--filter".to_owned(),
            format!("name=^{container}$"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use launcher_common::config::LauncherSettings;

    use super::*;

    fn config() -> ResolvedConfig {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("app.yml"),
            "base_image: discourse/base:2.0\nexpose: ['80:80']\nenv:\n  LANG: C\n  DISCOURSE_DB_PASSWORD: hunter2\n",
        )
        .expect("write");
        let settings = LauncherSettings {
            conf_dir: dir.path().to_path_buf(),
            templates_dir: dir.path().to_path_buf(),
            ..LauncherSettings::default()
        };
        launcher_compose::load_config(&settings, "app").expect("load")
    }

    #[test]
    fn build_hides_secrets_and_feeds_recipe() {
        let docker = DockerCli::default();
        let inv = docker.build(
            &config(),
            "local_discourse/app:latest",
            &RecipeOptions::new(),
            Path::new("/tmp/ctx"),
        );
        assert_eq!(
            inv.to_string(),
            "docker build --build-arg LANG --no-cache --pull --force-rm \
             -t local_discourse/app:latest --shm-size=512m -f - ."
        );
        assert!(inv.environment().contains(&("LANG".into(), "C".into())));
        assert!(
            !inv.environment()
                .iter()
                .any(|(k, _)| k == "DISCOURSE_DB_PASSWORD")
        );
        assert!(
            inv.environment()
                .contains(&("BUILDKIT_PROGRESS".into(), "plain".into()))
        );
        assert!(inv.input().is_some_and(|r| r.contains("ARG LANG")));
        assert_eq!(inv.working_dir(), Some(Path::new("/tmp/ctx")));
    }

    #[test]
    fn run_passes_all_env_values_through_environment() {
        let docker = DockerCli::default();
        let inv = docker.run(&config(), &LaunchOptions::new().name("app").detach(true));
        assert!(inv.arguments().starts_with(&[
            "run".to_owned(),
            "--env".to_owned(),
            "DISCOURSE_DB_PASSWORD".to_owned()
        ]));
        assert!(
            inv.environment()
                .contains(&("DISCOURSE_DB_PASSWORD".into(), "hunter2".into()))
        );
        assert_eq!(inv.arguments().last().map(String::as_str), Some("discourse/base:2.0"));
    }

    #[test]
    fn pups_run_skips_ports_and_pipes_payload() {
        let docker = DockerCli::default();
        let inv = docker
            .pups_run(&config(), LaunchOptions::new().remove(true), "--tags=db")
            .expect("pups run");
        assert!(!inv.arguments().iter().any(|a| a == "--publish"));
        let tail: Vec<_> = inv.arguments().iter().rev().take(3).rev().cloned().collect();
        assert_eq!(
            tail,
            vec!["/bin/bash", "-c", "/usr/local/bin/pups --stdin --tags=db"]
        );
        assert!(inv.input().is_some_and(|p| p.contains("LANG: C")));
    }

    #[test]
    fn commit_sets_boot_command() {
        let inv = DockerCli::default().commit(&config(), "app_bootstrap", "local_discourse/app");
        assert_eq!(
            inv.arguments(),
            [
                "commit",
                "--change",
                "CMD [\"/sbin/boot\"]",
                "app_bootstrap",
                "local_discourse/app"
            ]
        );
    }

    #[test]
    fn find_matches_exact_container_name() {
        let inv = DockerCli::new("/usr/bin/docker").find("app_bootstrap");
        assert_eq!(
            inv.to_string(),
            "/usr/bin/docker ps --all --quiet --filter name=^app_bootstrap$"
        );
        assert_eq!(
            DockerCli::default().remove("app_bootstrap").to_string(),
            "docker rm --force app_bootstrap"
        );
    }

    #[test]
    fn pups_run_without_args_has_no_trailing_space() {
        let docker = DockerCli::default();
        let inv = docker
            .pups_run(&config(), LaunchOptions::new(), "")
            .expect("pups run");
        assert_eq!(
            inv.arguments().last().map(String::as_str),
            Some("/usr/local/bin/pups --stdin")
        );
    }
}
