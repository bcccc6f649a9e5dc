//! Value objects describing external commands.

use std::fmt;
use std::path::{Path, PathBuf};

/// One external command: program, arguments, extra environment, optional
/// standard input and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    stdin: Option<String>,
    dir: Option<PathBuf>,
}

impl Invocation {
    /// Starts an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
            dir: None,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds one environment variable on top of the inherited environment.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Adds `KEY=VALUE` pairs; entries without `=` get an empty value.
    #[must_use]
    pub fn env_pairs<I, S>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.env.push((key.to_owned(), value.to_owned()));
        }
        self
    }

    /// Text fed to the command's standard input.
    #[must_use]
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Working directory for the command.
    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Executable to run.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Extra environment.
    #[must_use]
    pub fn environment(&self) -> &[(String, String)] {
        &self.env
    }

    /// Standard input text, if any.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    /// Working directory, if any.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let inv = Invocation::new("docker").args(["run", "--rm"]).arg("img");
        assert_eq!(inv.to_string(), "docker run --rm img");
    }

    #[test]
    fn env_pairs_split_on_first_equals() {
        let inv = Invocation::new("docker").env_pairs(["A=1", "URL=a=b", "BARE"]);
        assert_eq!(
            inv.environment(),
            &[
                ("A".to_owned(), "1".to_owned()),
                ("URL".to_owned(), "a=b".to_owned()),
                ("BARE".to_owned(), String::new()),
            ]
        );
    }

    #[test]
    fn stdin_and_dir_are_optional() {
        let inv = Invocation::new("docker");
        assert!(inv.input().is_none());
        assert!(inv.working_dir().is_none());
        let inv = inv.stdin("payload").dir("/tmp/build");
        assert_eq!(inv.input(), Some("payload"));
        assert_eq!(inv.working_dir(), Some(Path::new("/tmp/build")));
    }
}
