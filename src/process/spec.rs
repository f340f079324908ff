//! # Process specification: immutable launch parameters.
//!
//! [`ProcessSpec`] bundles everything needed to spawn one child process:
//! the executable, its arguments, an optional uid/gid to run as, the
//! environment, and an optional working directory. A spec is built once with
//! [`ProcessSpec::new`] plus `with_*` builders and never mutated afterwards;
//! every spec owns its environment map, so nothing is shared between
//! instances.
//!
//! Arguments are passed to the OS spawn primitive, not to a shell. To run a
//! shell command, use the common idiom:
//!
//! ```
//! use procvisor::ProcessSpec;
//!
//! let spec = ProcessSpec::new("/bin/sh").with_args(["-c", "echo hello"]);
//! assert_eq!(spec.program(), "/bin/sh");
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Immutable launch parameters for a supervised process.
///
/// Defaults: run as the supervisor's own uid/gid, inherit the supervisor's
/// environment (empty `env` map), inherit the working directory.
#[derive(Clone, Debug)]
pub struct ProcessSpec {
    program: String,
    args: Vec<String>,
    uid: Option<u32>,
    gid: Option<u32>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessSpec {
    /// Creates a spec that launches `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            uid: None,
            gid: None,
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Replaces the argument list (everything after the program itself).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the process as the given user id.
    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Runs the process with the given group id.
    pub fn with_gid(mut self, gid: u32) -> Self {
        self.gid = Some(gid);
        self
    }

    /// Gives the process exactly this environment.
    ///
    /// An empty map (the default) means the child inherits the supervisor's
    /// environment.
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Sets the working directory of the process.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// The executable path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments after the program itself.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// User id override, if any.
    pub fn uid(&self) -> Option<u32> {
        self.uid
    }

    /// Group id override, if any.
    pub fn gid(&self) -> Option<u32> {
        self.gid
    }

    /// The environment map; empty means inherit.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Working directory override, if any.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_inherit_everything() {
        let spec = ProcessSpec::new("/usr/bin/env");
        assert!(spec.args().is_empty());
        assert!(spec.uid().is_none());
        assert!(spec.gid().is_none());
        assert!(spec.env().is_empty());
        assert!(spec.cwd().is_none());
    }

    #[test]
    fn env_maps_are_not_shared_between_specs() {
        let a = ProcessSpec::new("a").with_env([("K", "1")]);
        let b = ProcessSpec::new("b");
        assert_eq!(a.env().get("K").map(String::as_str), Some("1"));
        assert!(b.env().is_empty());
    }

    #[test]
    fn builders_compose() {
        let spec = ProcessSpec::new("/srv/web")
            .with_args(["--port", "8080"])
            .with_uid(1000)
            .with_gid(1000)
            .with_cwd("/srv");
        assert_eq!(spec.args(), ["--port", "8080"]);
        assert_eq!(spec.uid(), Some(1000));
        assert_eq!(spec.cwd(), Some(Path::new("/srv")));
    }
}
