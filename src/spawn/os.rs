//! # OS spawner: real child processes via `tokio::process`.
//!
//! [`OsSpawner`] launches children with piped stdout/stderr and a null
//! stdin, drains both streams into the per-process [`LineLogger`], and
//! reports the exit through the [`ExitNotifier`] once the child is reaped.
//!
//! Signals are delivered by pid with `nix`; `ESRCH` maps to
//! [`SignalError::AlreadyExited`] so the supervisor can treat the
//! signal-vs-exit race as benign.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal as NixSignal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::error::{SignalError, SpawnError};
use crate::process::{LineLogger, ProcessSpec};
use crate::spawn::{ExitNotifier, ExitReason, ProcessHandle, Signal, Spawner};

/// Spawns real OS processes. Stateless; one instance serves the whole
/// supervisor.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSpawner;

impl Spawner for OsSpawner {
    fn spawn(
        &self,
        spec: &ProcessSpec,
        logger: LineLogger,
        notifier: ExitNotifier,
    ) -> Result<Box<dyn ProcessHandle>, SpawnError> {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !spec.env().is_empty() {
            cmd.env_clear();
            cmd.envs(spec.env());
        }
        if let Some(dir) = spec.cwd() {
            cmd.current_dir(dir);
        }
        if let Some(uid) = spec.uid() {
            cmd.uid(uid);
        }
        if let Some(gid) = spec.gid() {
            cmd.gid(gid);
        }

        let mut child = cmd.spawn().map_err(|source| SpawnError::Launch {
            command: spec.program().to_owned(),
            source,
        })?;

        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        tokio::spawn(supervise_child(child, stdout, stderr, logger, notifier));

        Ok(Box::new(OsHandle { pid }))
    }
}

/// Drains output, reaps the child, flushes the logger, reports the exit.
async fn supervise_child(
    mut child: Child,
    stdout: Option<tokio::process::ChildStdout>,
    stderr: Option<tokio::process::ChildStderr>,
    logger: LineLogger,
    notifier: ExitNotifier,
) {
    let logger = Arc::new(Mutex::new(logger));
    tokio::join!(
        drain(stdout, Arc::clone(&logger)),
        drain(stderr, Arc::clone(&logger)),
    );
    let status = child.wait().await;

    // Trailing partial line goes out before anyone learns about the exit.
    logger.lock().await.flush();
    notifier.notify(reason_of(status));
}

/// Reads one stream to EOF, feeding the shared logger.
async fn drain<R: AsyncRead + Unpin>(stream: Option<R>, logger: Arc<Mutex<LineLogger>>) {
    let Some(mut stream) = stream else { return };
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => logger.lock().await.feed(&chunk[..n]),
        }
    }
}

fn reason_of(status: std::io::Result<ExitStatus>) -> ExitReason {
    match status {
        Ok(st) => {
            if let Some(code) = st.code() {
                ExitReason::Exited { code }
            } else if let Some(signal) = st.signal() {
                ExitReason::Signaled { signal }
            } else {
                ExitReason::Unknown
            }
        }
        Err(_) => ExitReason::Unknown,
    }
}

/// Signal-delivery handle for a spawned child, addressed by pid.
#[derive(Debug)]
struct OsHandle {
    pid: Option<u32>,
}

impl ProcessHandle for OsHandle {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn signal(&self, sig: Signal) -> Result<(), SignalError> {
        let Some(pid) = self.pid else {
            return Err(SignalError::AlreadyExited);
        };
        let sig = match sig {
            Signal::Term => NixSignal::SIGTERM,
            Signal::Kill => NixSignal::SIGKILL,
        };
        match kill(Pid::from_raw(pid as i32), sig) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(SignalError::AlreadyExited),
            Err(errno) => Err(SignalError::Os { errno: errno as i32 }),
        }
    }
}
