//! The external cracking tool, seen through three calls.
//!
//! [`CrackTool`] is the seam between orchestration and the real binary:
//! enumerate candidate modes for a corpus, attack a subset under one mode,
//! and show what that attack recovered. [`Hashcat`] drives the `hashcat`
//! command line; tests substitute an in-memory fake.
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::mode::{Mode, parse_mode_table};
use crate::pot::parse_show_output;

/// Default executable name, looked up on `PATH`.
pub const DEFAULT_HASHCAT_BIN: &str = "hashcat";
/// Straight wordlist attack.
pub const DEFAULT_ATTACK_MODE: u8 = 0;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("`{0}` not found in PATH")]
    NotFound(String),
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Everything one attack (or its show call) runs against.
#[derive(Debug, Clone, Copy)]
pub struct AttemptRequest<'a> {
    pub mode_id: &'a str,
    pub subset: &'a Path,
    pub wordlist: &'a Path,
    pub store: &'a Path,
}

pub trait CrackTool {
    /// Modes structurally compatible with the hashes in `corpus`, in the
    /// order the tool reports them.
    fn enumerate(&self, corpus: &Path) -> Result<Vec<Mode>, ToolError>;

    /// Attack the subset. `true` iff at least one hash was cracked.
    fn attempt(&self, req: &AttemptRequest<'_>) -> Result<bool, ToolError>;

    /// Cracked `(hash, cleartext)` pairs recorded in the request's store.
    fn show(&self, req: &AttemptRequest<'_>) -> Result<Vec<(String, String)>, ToolError>;
}

#[derive(Debug, Clone)]
pub struct Hashcat {
    program: PathBuf,
    attack_mode: u8,
}

impl Default for Hashcat {
    fn default() -> Self {
        Self::new(DEFAULT_HASHCAT_BIN)
    }
}

impl Hashcat {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            attack_mode: DEFAULT_ATTACK_MODE,
        }
    }

    pub fn with_attack_mode(mut self, attack_mode: u8) -> Self {
        self.attack_mode = attack_mode;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn attack_command(&self, req: &AttemptRequest<'_>) -> Command {
        let mut cmd = self.command();
        cmd.arg("-m")
            .arg(req.mode_id)
            .arg("-a")
            .arg(self.attack_mode.to_string())
            .arg("--quiet")
            .arg("--potfile-path")
            .arg(req.store);
        cmd
    }

    fn spawn_error(&self, source: io::Error) -> ToolError {
        let program = self.program.display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::NotFound(program)
        } else {
            ToolError::Spawn { program, source }
        }
    }

    fn output(&self, mut cmd: Command) -> Result<Output, ToolError> {
        log::debug!("running {:?}", cmd);
        cmd.stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))
    }
}

impl CrackTool for Hashcat {
    fn enumerate(&self, corpus: &Path) -> Result<Vec<Mode>, ToolError> {
        let mut cmd = self.command();
        cmd.arg("--show").arg(corpus);
        let out = self.output(cmd)?;
        Ok(parse_mode_table(&String::from_utf8_lossy(&out.stdout)))
    }

    fn attempt(&self, req: &AttemptRequest<'_>) -> Result<bool, ToolError> {
        let mut cmd = self.attack_command(req);
        cmd.arg(req.subset).arg(req.wordlist);
        log::debug!("running {:?}", cmd);
        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;
        log::debug!("mode {} attack exited with {}", req.mode_id, status);
        Ok(status.success())
    }

    fn show(&self, req: &AttemptRequest<'_>) -> Result<Vec<(String, String)>, ToolError> {
        let mut cmd = self.attack_command(req);
        cmd.arg("--show").arg(req.subset).arg(req.wordlist);
        let out = self.output(cmd)?;
        Ok(parse_show_output(&String::from_utf8_lossy(&out.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn attack_command_carries_mode_attack_and_store() {
        let hc = Hashcat::new("hc").with_attack_mode(3);
        let req = AttemptRequest {
            mode_id: "1400",
            subset: Path::new("/tmp/subset"),
            wordlist: Path::new("/tmp/words"),
            store: Path::new("/tmp/pot"),
        };
        let cmd = hc.attack_command(&req);
        assert_eq!(cmd.get_program(), "hc");
        assert_eq!(
            args(&cmd),
            vec!["-m", "1400", "-a", "3", "--quiet", "--potfile-path", "/tmp/pot"]
        );
    }

    #[test]
    fn missing_binary_is_not_found() {
        let hc = Hashcat::new("/nonexistent/dir/hashcat-binary");
        match hc.enumerate(Path::new("/tmp/whatever")) {
            Err(ToolError::NotFound(p)) => assert!(p.contains("hashcat-binary")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
