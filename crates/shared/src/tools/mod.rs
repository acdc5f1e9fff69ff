//! Adapters for the external tools that do the heavy lifting.
//!
//! Each capability sits behind a small trait so front ends and tests can
//! swap the implementation; the default implementations shell out.

pub mod generator;
pub mod rembg;
pub mod triposr;

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Result, StudioError};

pub use generator::{DiffusersWorker, GenerationRequest, ImageGenerator, LazyGenerator};
pub use rembg::{remover_from_config, BackgroundRemover, ColorKeyRemover, RembgCommand};
pub use triposr::{Reconstructor, TripoSrCommand};

/// Keep error messages readable when a tool dumps a traceback.
const STDERR_TAIL: usize = 2000;

/// Replace `{name}` placeholders in every argument.
///
/// Each template is scanned once, so values are never expanded again.
pub fn substitute(args: &[String], vars: &[(&str, String)]) -> Vec<String> {
    args.iter().map(|arg| substitute_one(arg, vars)).collect()
}

fn substitute_one(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion; a non-zero exit is an error.
    pub fn run(&self, tool: &'static str) -> Result<Output> {
        tracing::info!("running {tool}: {}", self.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StudioError::ToolMissing {
                tool,
                detail: format!("`{}` could not be started: {e}", self.program),
            },
            _ => StudioError::io(&self.program, e),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("{tool} stdout: {}", stdout.trim());
        }

        if !output.status.success() {
            return Err(StudioError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr)),
            });
        }
        Ok(output)
    }
}

fn tail(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= STDERR_TAIL {
        return text.to_string();
    }
    match text.char_indices().rev().nth(STDERR_TAIL - 1) {
        Some((idx, _)) => format!("...{}", &text[idx..]),
        None => text.to_string(),
    }
}

/// Fail with `ToolFailed` if a tool exited cleanly but left no file behind.
pub(crate) fn expect_output(tool: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StudioError::ToolFailed {
            tool,
            status: "success".into(),
            stderr: format!("no output written to `{}`", path.display()),
        })
    }
}
