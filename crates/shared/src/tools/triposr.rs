//! Image-to-3D reconstruction via TripoSR's `run.py`.

use std::path::Path;

use super::ToolCommand;
use crate::config::TripoSrConfig;
use crate::error::{Result, StudioError};

pub trait Reconstructor: Send + Sync {
    /// Reconstruct `image` and leave the results somewhere under `out_dir`.
    fn reconstruct(&self, image: &Path, out_dir: &Path) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct TripoSrCommand {
    config: TripoSrConfig,
}

impl TripoSrCommand {
    pub fn new(config: TripoSrConfig) -> Self {
        Self { config }
    }

    /// Both paths must already be absolute: the tool runs inside its own
    /// directory.
    pub fn command(&self, image: &Path, out_dir: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.config.python)
            .arg(&self.config.script)
            .arg(image.display().to_string())
            .arg("--output-dir")
            .arg(out_dir.display().to_string());
        if self.config.bake_texture {
            cmd = cmd.arg("--bake-texture");
        }
        cmd.arg("--texture-resolution")
            .arg(self.config.texture_resolution.to_string())
            .cwd(&self.config.dir)
    }

    fn check_installed(&self) -> Result<()> {
        let script = self.config.dir.join(&self.config.script);
        if script.is_file() {
            return Ok(());
        }
        Err(StudioError::ToolMissing {
            tool: "TripoSR",
            detail: format!(
                "could not find `{}` in `{}`; verify that TripoSR is installed there",
                self.config.script,
                self.config.dir.display()
            ),
        })
    }
}

impl Reconstructor for TripoSrCommand {
    fn reconstruct(&self, image: &Path, out_dir: &Path) -> Result<()> {
        self.check_installed()?;

        let image = std::fs::canonicalize(image).map_err(|e| StudioError::io(image, e))?;
        let out_dir = std::fs::canonicalize(out_dir).map_err(|e| StudioError::io(out_dir, e))?;

        tracing::info!("TripoSR output directory: {}", out_dir.display());
        self.command(&image, &out_dir).run("TripoSR")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_command_line() {
        let cmd = TripoSrCommand::new(TripoSrConfig {
            dir: PathBuf::from("/opt/TripoSR"),
            ..Default::default()
        })
        .command(Path::new("/data/fg.png"), Path::new("/data/out/ab12cd34"));

        assert_eq!(cmd.program, "python3");
        assert_eq!(
            cmd.args,
            vec![
                "run.py",
                "/data/fg.png",
                "--output-dir",
                "/data/out/ab12cd34",
                "--bake-texture",
                "--texture-resolution",
                "1024"
            ]
        );
        assert_eq!(cmd.cwd, Some(PathBuf::from("/opt/TripoSR")));
    }

    #[test]
    fn test_command_without_baking() {
        let cmd = TripoSrCommand::new(TripoSrConfig {
            bake_texture: false,
            texture_resolution: 512,
            ..Default::default()
        })
        .command(Path::new("a.png"), Path::new("out"));
        assert!(!cmd.args.iter().any(|a| a == "--bake-texture"));
        assert_eq!(cmd.args.last().map(String::as_str), Some("512"));
    }

    #[test]
    fn test_missing_run_py() {
        let tmp = tempfile::tempdir().unwrap();
        let triposr = TripoSrCommand::new(TripoSrConfig {
            dir: tmp.path().to_path_buf(),
            ..Default::default()
        });
        let err = triposr
            .reconstruct(&tmp.path().join("fg.png"), tmp.path())
            .unwrap_err();
        match err {
            StudioError::ToolMissing { tool, detail } => {
                assert_eq!(tool, "TripoSR");
                assert!(detail.contains("run.py"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_script_in_tool_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let tool_dir = tmp.path().join("TripoSR");
        let out_dir = tmp.path().join("out");
        std::fs::create_dir_all(&tool_dir).unwrap();
        std::fs::create_dir_all(&out_dir).unwrap();
        // stand-in for run.py: `sh run.sh <image> --output-dir <dir> ...`
        std::fs::write(tool_dir.join("run.sh"), "mkdir -p \"$3/0\" && touch \"$3/0/mesh.obj\"\n")
            .unwrap();
        let image = tmp.path().join("fg.png");
        std::fs::write(&image, b"png").unwrap();

        let triposr = TripoSrCommand::new(TripoSrConfig {
            dir: tool_dir,
            python: "sh".into(),
            script: "run.sh".into(),
            ..Default::default()
        });
        triposr.reconstruct(&image, &out_dir).unwrap();
        assert!(out_dir.join("0/mesh.obj").is_file());
    }
}
