use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::encode::publish::{discard, ensure_parent_dir, publish, publish_new, temp_path_for};
use crate::encode::shutdown::{ChildSlot, kill_and_reap, lock, register};
use crate::encode::sink::{FrameRGBA, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReactionError, ReactionResult};

const PROGRESS_EVERY_FRAMES: u64 = 300;
const STDERR_TAIL_BYTES: usize = 4096;
const WAIT_POLL: Duration = Duration::from_millis(10);

/// Builds the encoder command for one job.
///
/// The sink owns stdio: whatever the launcher sets on stdin/stdout/stderr is overridden.
pub trait EncoderLauncher {
    /// Command that reads raw RGBA frames described by `cfg` from stdin and writes `output`.
    fn command(&self, cfg: &SinkConfig, output: &Path) -> ReactionResult<Command>;

    /// Short name used in logs and error messages.
    fn name(&self) -> &str {
        "encoder"
    }
}

impl<L: EncoderLauncher + ?Sized> EncoderLauncher for &L {
    fn command(&self, cfg: &SinkConfig, output: &Path) -> ReactionResult<Command> {
        (**self).command(cfg, output)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Lifecycle of an [`EncoderSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    Idle,
    Streaming,
    Succeeded,
    Failed,
}

/// Owns a spawned child and terminates it if it is still running when released.
///
/// The child is also listed for [`terminate_encoders`](crate::encode::shutdown::terminate_encoders).
/// Termination happens at most once across both paths; later calls and the final `Drop` are
/// no-ops.
#[derive(Debug)]
pub struct ChildGuard {
    child: Arc<ChildSlot>,
    pid: u32,
}

impl ChildGuard {
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: register(child),
            pid,
        }
    }

    pub fn id(&self) -> Option<u32> {
        lock(&self.child).as_ref().map(|_| self.pid)
    }

    pub fn is_released(&self) -> bool {
        lock(&self.child).is_none()
    }

    /// Kill the child if it has not exited yet, then reap it.
    ///
    /// Returns `true` only when this call actually killed a running process.
    pub fn terminate(&mut self) -> bool {
        kill_and_reap(&self.child)
    }

    /// Wait for a normal exit and release the child.
    ///
    /// Polls so the slot stays reachable for a termination handler while the encoder finishes.
    pub fn wait(&mut self) -> ReactionResult<ExitStatus> {
        loop {
            {
                let mut slot = lock(&self.child);
                let child = slot.as_mut().ok_or_else(|| {
                    ReactionError::encode("encoder process was already released")
                })?;
                match child.try_wait() {
                    Ok(Some(status)) => {
                        *slot = None;
                        return Ok(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        return Err(ReactionError::encode(format!(
                            "failed to wait for encoder: {e}"
                        )));
                    }
                }
            }
            std::thread::sleep(WAIT_POLL);
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Options for [`EncoderSink`].
#[derive(Clone, Debug)]
pub struct EncoderSinkOpts {
    /// Final output path. Written only by the atomic publish step.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Pass encoder stderr through instead of capturing it.
    pub verbose: bool,
}

impl EncoderSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            verbose: false,
        }
    }
}

/// Sink that streams raw frames into an external encoder process.
///
/// The encoder writes to a temporary sibling of the destination; the file is renamed into place
/// only after the encoder exits successfully. On any failure the child is terminated and reaped
/// and the temporary file is left unpublished.
pub struct EncoderSink<L> {
    launcher: L,
    opts: EncoderSinkOpts,
    state: SinkState,

    cfg: Option<SinkConfig>,
    temp_path: Option<PathBuf>,
    guard: Option<ChildGuard>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    next_idx: u64,
}

impl<L: EncoderLauncher> EncoderSink<L> {
    pub fn new(launcher: L, opts: EncoderSinkOpts) -> Self {
        Self {
            launcher,
            opts,
            state: SinkState::Idle,
            cfg: None,
            temp_path: None,
            guard: None,
            stdin: None,
            stderr_drain: None,
            next_idx: 0,
        }
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Temporary output path of the current or last job.
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp_path.as_deref()
    }

    /// Process id of the running encoder, if any.
    pub fn child_id(&self) -> Option<u32> {
        self.guard.as_ref().and_then(ChildGuard::id)
    }

    pub fn frames_written(&self) -> u64 {
        self.next_idx
    }

    /// Terminate the encoder and mark the sink failed. Returns captured stderr.
    fn terminate_encoder(&mut self) -> String {
        drop(self.stdin.take());
        if let Some(mut guard) = self.guard.take() {
            guard.terminate();
        }
        let stderr = self.join_stderr();
        self.state = SinkState::Failed;
        if let Some(temp) = self.temp_path.as_deref() {
            tracing::warn!(
                encoder = self.launcher.name(),
                temp = %temp.display(),
                "encoding aborted; temporary output left unpublished"
            );
        }
        stderr
    }

    fn join_stderr(&mut self) -> String {
        let Some(handle) = self.stderr_drain.take() else {
            return String::new();
        };
        match handle.join() {
            Ok(Ok(bytes)) => stderr_tail(&bytes),
            Ok(Err(e)) => format!("<stderr read failed: {e}>"),
            Err(_) => "<stderr drain thread panicked>".to_owned(),
        }
    }

    fn fail(&mut self, err: ReactionError) -> ReactionError {
        let stderr = self.terminate_encoder();
        match err {
            ReactionError::Encode(msg) if !stderr.is_empty() => {
                ReactionError::encode(format!("{msg}: {stderr}"))
            }
            other => other,
        }
    }

    fn streaming_cfg(&self) -> ReactionResult<SinkConfig> {
        match (self.state, self.cfg) {
            (SinkState::Streaming, Some(cfg)) => Ok(cfg),
            (state, _) => Err(ReactionError::encode(format!(
                "{} sink is not streaming (state {state:?})",
                self.launcher.name()
            ))),
        }
    }
}

impl<L: EncoderLauncher> FrameSink for EncoderSink<L> {
    fn begin(&mut self, cfg: SinkConfig) -> ReactionResult<()> {
        if self.state != SinkState::Idle {
            return Err(ReactionError::validation(format!(
                "{} sink can only be started once (state {:?})",
                self.launcher.name(),
                self.state
            )));
        }
        cfg.validate()?;

        let out_path = self.opts.out_path.clone();
        ensure_parent_dir(&out_path)?;
        if !self.opts.overwrite && out_path.exists() {
            return Err(ReactionError::validation(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }
        let temp_path = temp_path_for(&out_path)?;
        discard(&temp_path);

        let mut cmd = self.launcher.command(&cfg, &temp_path)?;
        cmd.stdin(Stdio::piped()).stdout(Stdio::null());
        if self.opts.verbose {
            cmd.stderr(Stdio::inherit());
        } else {
            cmd.stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|e| {
            ReactionError::encode(format!(
                "failed to spawn {} (is it installed and on PATH?): {e}",
                self.launcher.name()
            ))
        })?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take();
        let guard = ChildGuard::new(child);
        let stdin = stdin.ok_or_else(|| ReactionError::encode("failed to open encoder stdin"))?;

        self.stderr_drain = stderr.map(|mut stderr| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                stderr.read_to_end(&mut bytes)?;
                Ok(bytes)
            })
        });

        tracing::info!(
            encoder = self.launcher.name(),
            pid = guard.id(),
            width = cfg.width,
            height = cfg.height,
            fps = %cfg.fps,
            temp = %temp_path.display(),
            "spawned encoder"
        );

        self.guard = Some(guard);
        self.stdin = Some(stdin);
        self.temp_path = Some(temp_path);
        self.cfg = Some(cfg);
        self.next_idx = 0;
        self.state = SinkState::Streaming;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReactionResult<()> {
        let cfg = self.streaming_cfg()?;

        if idx.0 != self.next_idx {
            let err = ReactionError::validation(format!(
                "out-of-order frame index: expected {}, got {}",
                self.next_idx, idx.0
            ));
            return Err(self.fail(err));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            let err = ReactionError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            ));
            return Err(self.fail(err));
        }
        if frame.data.len() != cfg.frame_bytes() {
            let err = ReactionError::validation("frame.data size mismatch with width*height*4");
            return Err(self.fail(err));
        }

        let write = match self.stdin.as_mut() {
            Some(stdin) => stdin.write_all(&frame.data),
            None => return Err(self.fail(ReactionError::encode("encoder stdin is closed"))),
        };
        if let Err(e) = write {
            let err = ReactionError::encode(format!(
                "failed to write frame {} to {} stdin: {e}",
                idx.0,
                self.launcher.name()
            ));
            return Err(self.fail(err));
        }

        self.next_idx += 1;
        if self.next_idx.is_multiple_of(PROGRESS_EVERY_FRAMES) {
            tracing::debug!(frames = self.next_idx, "streamed frames to encoder");
        }
        Ok(())
    }

    fn end(&mut self) -> ReactionResult<()> {
        self.streaming_cfg()?;
        drop(self.stdin.take());

        let status = match self.guard.as_mut() {
            Some(guard) => guard.wait(),
            None => Err(ReactionError::encode("encoder process is missing")),
        };
        let status = match status {
            Ok(status) => status,
            Err(e) => return Err(self.fail(e)),
        };
        self.guard = None;
        let stderr = self.join_stderr();

        if !status.success() {
            self.state = SinkState::Failed;
            tracing::warn!(
                encoder = self.launcher.name(),
                %status,
                "encoder failed; output not published"
            );
            return Err(ReactionError::encode(format!(
                "{} exited with status {status}: {stderr}",
                self.launcher.name()
            )));
        }

        let temp = self
            .temp_path
            .clone()
            .ok_or_else(|| ReactionError::encode("temporary output path is missing"))?;
        let published = if self.opts.overwrite {
            publish(&temp, &self.opts.out_path)
        } else {
            publish_new(&temp, &self.opts.out_path)
        };
        if let Err(e) = published {
            self.state = SinkState::Failed;
            tracing::warn!(
                encoder = self.launcher.name(),
                temp = %temp.display(),
                error = %e,
                "output not published"
            );
            return Err(e);
        }
        self.state = SinkState::Succeeded;
        tracing::info!(
            encoder = self.launcher.name(),
            frames = self.next_idx,
            out = %self.opts.out_path.display(),
            "published output"
        );
        Ok(())
    }

    fn abort(&mut self) {
        if self.state == SinkState::Streaming {
            self.terminate_encoder();
        }
    }
}

fn stderr_tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/process.rs"]
mod tests;
