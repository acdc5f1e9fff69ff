//! Text-to-image generation (SSD-1B through a diffusers script by default).

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::{expect_output, substitute, ToolCommand};
use crate::config::GeneratorConfig;
use crate::error::{Result, StudioError};

/// Appended to prompts when the caller asks for a clean cut-out.
pub const CLEAN_CUTOUT_SUFFIX: &str =
    ", isolated object, plain background, minimal shadows, studio lighting";

pub const MIN_STEPS: u32 = 5;
pub const MAX_STEPS: u32 = 40;
pub const MIN_GUIDANCE: f32 = 1.0;
pub const MAX_GUIDANCE: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub steps: u32,
    pub guidance: f32,
}

impl GenerationRequest {
    /// Build the final prompt and clamp sampler settings into a sane range.
    pub fn new(prompt: &str, keep_shadows: bool, steps: u32, guidance: f32) -> Result<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::MissingInput("prompt"));
        }

        let mut prompt = prompt.to_string();
        if !keep_shadows {
            prompt.push_str(CLEAN_CUTOUT_SUFFIX);
        }

        let guidance = if guidance.is_nan() {
            MIN_GUIDANCE
        } else {
            guidance.clamp(MIN_GUIDANCE, MAX_GUIDANCE)
        };

        Ok(Self {
            prompt,
            steps: steps.clamp(MIN_STEPS, MAX_STEPS),
            guidance,
        })
    }
}

pub trait ImageGenerator: Send + Sync {
    fn model_id(&self) -> &str;

    fn generate(&self, request: &GenerationRequest, output: &Path) -> Result<()>;
}

/// One line of the worker protocol sent on stdin.
#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    prompt: &'a str,
    steps: u32,
    guidance: f32,
    output: &'a str,
}

/// One line the worker prints on stdout. Lines that are not JSON objects
/// are treated as log noise.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkerReply {
    status: Option<String>,
    ok: bool,
    error: Option<String>,
}

/// A running generator process with the model loaded.
struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    fn spawn(cmd: &ToolCommand) -> Result<Self> {
        tracing::info!("starting image generator: {}", cmd.display());
        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }
        let mut child = command.spawn().map_err(|e| {
            StudioError::ModelLoad(format!("`{}` could not be started: {e}", cmd.program))
        })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(StudioError::ModelLoad("generator pipes unavailable".into()));
        };
        let mut worker = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        match worker.read_reply()? {
            Some(reply) if reply.status.as_deref() == Some("ready") => Ok(worker),
            Some(reply) => Err(StudioError::ModelLoad(
                reply.error.unwrap_or_else(|| "unexpected greeting".into()),
            )),
            None => Err(StudioError::ModelLoad(
                "generator exited before the model was ready".into(),
            )),
        }
    }

    /// Next protocol line, or `None` once the worker closed stdout.
    fn read_reply(&mut self) -> Result<Option<WorkerReply>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .stdout
                .read_line(&mut line)
                .map_err(|e| StudioError::io("generator stdout", e))?;
            if read == 0 {
                return Ok(None);
            }
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<WorkerReply>(text) {
                Ok(reply) => return Ok(Some(reply)),
                Err(_) => tracing::debug!("image generator: {text}"),
            }
        }
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn request(&mut self, request: &GenerationRequest, output: &Path) -> Result<()> {
        let output = output.display().to_string();
        let line = serde_json::to_string(&WorkerRequest {
            prompt: &request.prompt,
            steps: request.steps,
            guidance: request.guidance,
            output: &output,
        })
        .map_err(|e| StudioError::Decode(e.to_string()))?;

        writeln!(self.stdin, "{line}")
            .and_then(|()| self.stdin.flush())
            .map_err(|e| StudioError::io("generator stdin", e))?;

        match self.read_reply()? {
            Some(WorkerReply { error: Some(error), .. }) => Err(StudioError::ToolFailed {
                tool: "image generator",
                status: "error".into(),
                stderr: error,
            }),
            Some(WorkerReply { ok: true, .. }) => Ok(()),
            Some(_) => Err(StudioError::ToolFailed {
                tool: "image generator",
                status: "error".into(),
                stderr: "unexpected reply".into(),
            }),
            None => Err(StudioError::ToolFailed {
                tool: "image generator",
                status: "exited".into(),
                stderr: "worker closed its output".into(),
            }),
        }
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Keeps one generator process alive so the model loads only once.
///
/// Requests are serialized through the process lock. A worker that died is
/// started again on the next request.
pub struct DiffusersWorker {
    model_id: String,
    command: ToolCommand,
    process: Mutex<Option<WorkerProcess>>,
}

impl DiffusersWorker {
    /// Start the worker and wait until it reports the model as ready.
    pub fn load(config: &GeneratorConfig) -> Result<Self> {
        tracing::info!(
            "loading model {} (this may take a minute)...",
            config.model_id
        );
        let program = which::which(&config.program).map_err(|e| {
            StudioError::ModelLoad(format!("`{}` not found: {e}", config.program))
        })?;
        if let Some(dir) = &config.workdir {
            if !dir.is_dir() {
                return Err(StudioError::ModelLoad(format!(
                    "generator directory `{}` does not exist",
                    dir.display()
                )));
            }
        }

        let command = Self::command(config, &program);
        let process = WorkerProcess::spawn(&command)?;
        tracing::info!("model {} ready ({})", config.model_id, program.display());

        Ok(Self {
            model_id: config.model_id.clone(),
            command,
            process: Mutex::new(Some(process)),
        })
    }

    pub fn command(config: &GeneratorConfig, program: &Path) -> ToolCommand {
        let args = substitute(&config.args, &[("model", config.model_id.clone())]);
        let cmd = ToolCommand::new(program.display().to_string()).args(args);
        match &config.workdir {
            Some(dir) => cmd.cwd(dir),
            None => cmd,
        }
    }
}

impl ImageGenerator for DiffusersWorker {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate(&self, request: &GenerationRequest, output: &Path) -> Result<()> {
        let mut slot = self.process.lock().unwrap_or_else(|e| e.into_inner());
        if !slot.as_mut().is_some_and(WorkerProcess::is_alive) {
            tracing::warn!("image generator is not running, restarting");
            *slot = None;
            *slot = Some(WorkerProcess::spawn(&self.command)?);
        }
        let Some(worker) = slot.as_mut() else {
            return Err(StudioError::ModelLoad("generator unavailable".into()));
        };

        tracing::info!("generating {} ({} steps)", output.display(), request.steps);
        if let Err(e) = worker.request(request, output) {
            // An error reply leaves the worker usable; anything else means
            // the pipe is broken and the process has to go.
            let replied = matches!(&e, StudioError::ToolFailed { status, .. } if status == "error");
            if !replied {
                *slot = None;
            }
            return Err(e);
        }
        expect_output("image generator", output)
    }
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn ImageGenerator>> + Send + Sync>;

/// Loads the generator on first use and caches it.
///
/// The lock is held while loading, so concurrent first requests wait for a
/// single load. A failed load leaves the slot empty and is retried next time.
pub struct LazyGenerator {
    slot: Mutex<Option<Arc<dyn ImageGenerator>>>,
    loader: Loader,
}

impl LazyGenerator {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ImageGenerator>> + Send + Sync + 'static,
    {
        Self {
            slot: Mutex::new(None),
            loader: Box::new(loader),
        }
    }

    pub fn from_config(config: GeneratorConfig) -> Self {
        Self::new(move || {
            let generator: Arc<dyn ImageGenerator> = Arc::new(DiffusersWorker::load(&config)?);
            Ok(generator)
        })
    }

    /// Wrap an already constructed generator.
    pub fn ready(generator: Arc<dyn ImageGenerator>) -> Self {
        let lazy = Self::new(|| Err(StudioError::ModelLoad("no loader".into())));
        *lazy.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(generator);
        lazy
    }

    pub fn get(&self) -> Result<Arc<dyn ImageGenerator>> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(generator) = slot.as_ref() {
            return Ok(Arc::clone(generator));
        }

        let generator = (self.loader)().inspect_err(|e| {
            tracing::error!("failed to load generator: {e}");
        })?;
        *slot = Some(Arc::clone(&generator));
        Ok(generator)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}
