use super::*;
use crate::foundation::core::Fps;

/// Runs `sh -c <script> <output>`, so scripts see the output path as `$0`.
struct ShLauncher(&'static str);

impl EncoderLauncher for ShLauncher {
    fn command(&self, _cfg: &SinkConfig, output: &Path) -> ReactionResult<Command> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(self.0).arg(output);
        Ok(cmd)
    }

    fn name(&self) -> &str {
        "sh"
    }
}

struct MissingProgram;

impl EncoderLauncher for MissingProgram {
    fn command(&self, _cfg: &SinkConfig, _output: &Path) -> ReactionResult<Command> {
        Ok(Command::new("/nonexistent/encoder-for-tests"))
    }
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
    }
}

fn frame(width: u32, height: u32, fill: u8) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: vec![fill; width as usize * height as usize * 4],
    }
}

fn process_gone(pid: u32) -> bool {
    !Path::new(&format!("/proc/{pid}")).exists()
}

fn has_procfs() -> bool {
    Path::new("/proc/self").exists()
}

#[test]
fn successful_encode_publishes_once() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out").join("card.mp4");
    let mut sink = EncoderSink::new(ShLauncher(r#"cat > "$0""#), EncoderSinkOpts::new(&dest));

    sink.begin(cfg(4, 2)).unwrap();
    assert_eq!(sink.state(), SinkState::Streaming);
    for i in 0..3u8 {
        sink.push_frame(FrameIndex(u64::from(i)), &frame(4, 2, i)).unwrap();
    }
    sink.end().unwrap();

    assert_eq!(sink.state(), SinkState::Succeeded);
    assert_eq!(sink.frames_written(), 3);
    let bytes = std::fs::read(&dest).unwrap();
    assert_eq!(bytes.len(), 3 * 32);
    assert_eq!(bytes[32], 1);
    assert!(!dir.path().join("out").join("card.part.mp4").exists());
    assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 1);
}

#[test]
fn out_of_order_frame_aborts_and_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    let mut sink = EncoderSink::new(ShLauncher(r#"cat > "$0""#), EncoderSinkOpts::new(&dest));
    sink.begin(cfg(2, 2)).unwrap();
    let pid = sink.child_id().unwrap();

    sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).unwrap();
    let err = sink.push_frame(FrameIndex(2), &frame(2, 2, 0)).unwrap_err();
    assert!(matches!(err, ReactionError::Validation(_)), "{err}");
    assert_eq!(sink.state(), SinkState::Failed);
    assert_eq!(sink.child_id(), None);
    assert!(!dest.exists());
    if has_procfs() {
        assert!(process_gone(pid));
    }

    // A failed sink refuses further work.
    assert!(sink.push_frame(FrameIndex(1), &frame(2, 2, 0)).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn wrong_frame_size_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = EncoderSink::new(
        ShLauncher(r#"cat > "$0""#),
        EncoderSinkOpts::new(dir.path().join("a.mp4")),
    );
    sink.begin(cfg(2, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(4, 2, 0)).is_err());
    assert_eq!(sink.state(), SinkState::Failed);
}

#[test]
fn encoder_dying_mid_stream_fails_without_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    let mut sink = EncoderSink::new(
        ShLauncher(r#"head -c 100 > "$0"; echo "simulated failure" >&2; exit 3"#),
        EncoderSinkOpts::new(&dest),
    );
    sink.begin(cfg(256, 256)).unwrap();
    let pid = sink.child_id().unwrap();

    let mut failed_at = None;
    for i in 0..16u64 {
        if let Err(e) = sink.push_frame(FrameIndex(i), &frame(256, 256, 7)) {
            assert!(matches!(e, ReactionError::Encode(_)), "{e}");
            failed_at = Some(i);
            break;
        }
    }
    assert!(failed_at.is_some(), "encoder never rejected a write");
    assert_eq!(sink.state(), SinkState::Failed);
    assert!(!dest.exists());
    if has_procfs() {
        assert!(process_gone(pid));
    }
}

#[test]
fn non_zero_exit_leaves_temp_unpublished() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    let mut sink = EncoderSink::new(
        ShLauncher(r#"cat > "$0"; echo "bad codec" >&2; exit 1"#),
        EncoderSinkOpts::new(&dest),
    );
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).unwrap();
    let err = sink.end().unwrap_err();

    assert!(err.to_string().contains("bad codec"), "{err}");
    assert_eq!(sink.state(), SinkState::Failed);
    assert!(!dest.exists());
    assert!(dir.path().join("card.part.mp4").exists());
}

#[test]
fn existing_output_is_kept_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    std::fs::write(&dest, b"done").unwrap();
    let mut opts = EncoderSinkOpts::new(&dest);
    opts.overwrite = false;
    let mut sink = EncoderSink::new(ShLauncher(r#"cat > "$0""#), opts);

    assert!(matches!(
        sink.begin(cfg(2, 2)).unwrap_err(),
        ReactionError::Validation(_)
    ));
    assert_eq!(sink.state(), SinkState::Idle);
    assert_eq!(std::fs::read(&dest).unwrap(), b"done");
}

#[test]
fn output_created_during_encoding_is_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    let mut opts = EncoderSinkOpts::new(&dest);
    opts.overwrite = false;
    let mut sink = EncoderSink::new(
        ShLauncher(r#"cat > "$0"; printf other > "${0%.part.mp4}.mp4""#),
        opts,
    );

    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 5)).unwrap();
    let err = sink.end().unwrap_err();

    assert!(matches!(err, ReactionError::Validation(_)), "{err}");
    assert_eq!(sink.state(), SinkState::Failed);
    assert_eq!(std::fs::read(&dest).unwrap(), b"other");
    let temp = sink.temp_path().unwrap();
    assert_eq!(temp, dir.path().join("card.part.mp4"));
    assert_eq!(std::fs::read(temp).unwrap().len(), 16);
}

#[test]
fn spawn_failure_is_an_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = EncoderSink::new(MissingProgram, EncoderSinkOpts::new(dir.path().join("x.mp4")));
    let err = sink.begin(cfg(2, 2)).unwrap_err();
    assert!(matches!(err, ReactionError::Encode(_)), "{err}");
}

#[test]
fn push_before_begin_is_rejected() {
    let mut sink = EncoderSink::new(ShLauncher("true"), EncoderSinkOpts::new("unused.mp4"));
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn begin_twice_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = EncoderSink::new(
        ShLauncher(r#"cat > "$0""#),
        EncoderSinkOpts::new(dir.path().join("x.mp4")),
    );
    sink.begin(cfg(2, 2)).unwrap();
    assert!(sink.begin(cfg(2, 2)).is_err());
    sink.end().unwrap();
}

#[test]
fn child_guard_terminates_once() {
    let child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();
    let mut guard = ChildGuard::new(child);
    assert_eq!(guard.id(), Some(pid));
    assert!(guard.terminate());
    assert!(!guard.terminate());
    assert!(guard.is_released());
    if has_procfs() {
        assert!(process_gone(pid));
    }
}

#[test]
fn child_guard_does_not_kill_exited_child() {
    let child = Command::new("true").spawn().unwrap();
    let mut guard = ChildGuard::new(child);
    std::thread::sleep(std::time::Duration::from_millis(200));
    assert!(!guard.terminate());
}

#[test]
fn encoder_killed_elsewhere_is_not_killed_again() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    let mut sink = EncoderSink::new(ShLauncher("cat > /dev/null"), EncoderSinkOpts::new(&dest));
    sink.begin(cfg(2, 2)).unwrap();
    let pid = sink.child_id().unwrap();

    // What a termination handler does through the shared slot.
    let guard = sink.guard.as_ref().unwrap();
    assert!(kill_and_reap(&guard.child));
    assert!(guard.is_released());
    assert_eq!(sink.child_id(), None);
    if has_procfs() {
        assert!(process_gone(pid));
    }

    assert!(sink.end().is_err());
    assert_eq!(sink.state(), SinkState::Failed);
    assert!(!dest.exists());
}

#[test]
fn dropping_a_streaming_sink_kills_the_encoder() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("card.mp4");
    let pid = {
        let mut sink = EncoderSink::new(ShLauncher("cat > /dev/null"), EncoderSinkOpts::new(&dest));
        sink.begin(cfg(2, 2)).unwrap();
        sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).unwrap();
        sink.child_id().unwrap()
    };
    assert!(!dest.exists());
    if has_procfs() {
        assert!(process_gone(pid));
    }
}

#[test]
fn upstream_abort_kills_encoder_without_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("aborted.mp4");
    let mut sink = EncoderSink::new(ShLauncher(r#"cat > "$0""#), EncoderSinkOpts::new(&dest));

    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 7)).unwrap();
    let pid = sink.child_id().unwrap();
    FrameSink::abort(&mut sink);

    assert_eq!(sink.state(), SinkState::Failed);
    assert_eq!(sink.child_id(), None);
    assert!(!dest.exists());
    if has_procfs() {
        assert!(process_gone(pid));
    }
    // Only a streaming sink is affected.
    FrameSink::abort(&mut sink);
    assert_eq!(sink.state(), SinkState::Failed);
}
