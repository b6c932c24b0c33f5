//! On-disk project directories driven by `sh` instead of terraform.
//!
//! With `tool = "sh"`, the engine runs `sh init` / `sh plan` inside the
//! project directory, i.e. the `init` and `plan` files written here. No
//! executable bits are involved.

use std::fs;
use std::path::{Path, PathBuf};

/// Tool name to configure when using [`FakeProject`] directories.
pub const FAKE_TOOL: &str = "sh";

/// Every script appends its own name here, so tests can see what ran.
pub const INVOCATION_LOG: &str = "invocations.log";

pub struct FakeProject {
    dir: PathBuf,
}

impl FakeProject {
    /// Create `root/name` with default `init` and `plan` scripts that
    /// succeed without output.
    pub fn new(root: &Path, name: &str) -> Self {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        let project = Self { dir };
        project.write("init", "exit 0");
        project.write("plan", "exit 0");
        project
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn init_script(self, body: &str) -> Self {
        self.write("init", body);
        self
    }

    pub fn plan_script(self, body: &str) -> Self {
        self.write("plan", body);
        self
    }

    /// Commands that ran in this directory, in order.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.dir.join(INVOCATION_LOG))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn write(&self, name: &str, body: &str) {
        let script = format!("echo {name} >> {INVOCATION_LOG}\n{body}\n");
        fs::write(self.dir.join(name), script).unwrap();
    }
}
