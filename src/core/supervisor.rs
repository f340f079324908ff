//! # Supervisor: the process-lifecycle state machine.
//!
//! The [`Supervisor`] owns the table of named process specifications and all
//! per-process runtime state (live handle, backoff delay, spawn timestamp,
//! pending timers). It runs as one single-threaded actor loop; everything
//! that can change process state arrives as a message:
//!
//! ```text
//! Inputs to the loop:
//!   Command      — API calls via SupervisorHandle (ack'd with oneshot)
//!   ExitNotice   — a spawner reporting a child's termination
//!   TimerFired   — an armed restart / kill-escalation timer expiring
//!
//!                          ┌──────────────────────────────┐
//!   SupervisorHandle ────► │                              │ ──► Spawner
//!   spawner tasks    ────► │     Supervisor (one task)    │ ──► Bus (events)
//!   timer tasks      ────► │  HashMap<name, ProcEntry>    │ ──► timers
//!                          └──────────────────────────────┘
//! ```
//!
//! ## Per-name state machine
//! ```text
//! Idle ─ start ─► Running ─ exit < threshold ─► ScheduledRestart(delay, x2)
//!                    │     ─ exit ≥ threshold ─► ScheduledRestart(0, reset)
//!                    │                                  │
//!                    │◄─────────── timer fires ─────────┘
//!                    │
//!                    └─ stop_process ─► TERM sent, kill timer armed
//!                                        ├─ exit first  → timer cancelled
//!                                        └─ timer fires → KILL
//! ```
//!
//! ## Rules
//! - At most one live handle per name: `start_process` is a no-op while one
//!   exists.
//! - A kill timer exists only while its process is live; the exit
//!   observation cancels it.
//! - Deactivation cancels every restart timer before stopping anything, so
//!   no process is relaunched after shutdown begins.
//! - Timers re-enter the loop as messages carrying their cancellation
//!   token; a firing whose token was cancelled late is discarded as stale.
//! - Spawn failures are converted into instant exits and ride the normal
//!   backoff path; they are never surfaced as errors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::handle::{Command, SupervisorHandle};
use crate::error::{SignalError, SupervisorError};
use crate::events::{Bus, Event, EventKind};
use crate::process::{LineLogger, ProcessSpec};
use crate::spawn::{ExitNotice, ExitNotifier, ExitReason, ProcessHandle, Signal, Spawner};
use crate::subscribers::{Subscriber, SubscriberSet};

/// Which pending timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    /// A scheduled restart elapsed.
    Restart,
    /// The graceful-stop window elapsed; escalate to KILL.
    Kill,
}

/// A timer expiration re-entering the loop.
struct TimerFired {
    name: Arc<str>,
    kind: TimerKind,
    token: CancellationToken,
}

/// Runtime state for one registered name.
struct ProcEntry {
    name: Arc<str>,
    spec: ProcessSpec,
    /// Current restart backoff; starts at `min_restart_delay`.
    delay: Duration,
    /// When the most recent spawn happened; absent while not running.
    started_at: Option<Instant>,
    /// Present iff a process is spawned and has not yet reported exit.
    live: Option<Box<dyn ProcessHandle>>,
    /// Armed restart, cancellable.
    restart_timer: Option<CancellationToken>,
    /// Armed stop escalation; exists only while `live` does.
    kill_timer: Option<CancellationToken>,
}

impl ProcEntry {
    fn new(name: Arc<str>, spec: ProcessSpec, delay: Duration) -> Self {
        Self {
            name,
            spec,
            delay,
            started_at: None,
            live: None,
            restart_timer: None,
            kill_timer: None,
        }
    }

    fn cancel_restart_timer(&mut self) {
        if let Some(token) = self.restart_timer.take() {
            token.cancel();
        }
    }

    fn cancel_kill_timer(&mut self) {
        if let Some(token) = self.kill_timer.take() {
            token.cancel();
        }
    }
}

/// Keeps registered processes alive while active, restarting them on exit
/// with exponential backoff and escalating graceful stops to forced kills.
pub struct Supervisor {
    /// Global runtime configuration.
    pub cfg: Config,
    /// Event bus; subscribe for lifecycle and output events.
    pub bus: Bus,
    subs: Arc<SubscriberSet>,
    spawner: Arc<dyn Spawner>,
    table: HashMap<Arc<str>, ProcEntry>,
    running: bool,
    cmd_tx: mpsc::UnboundedSender<Command>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    exit_tx: mpsc::UnboundedSender<ExitNotice>,
    exit_rx: mpsc::UnboundedReceiver<ExitNotice>,
    timer_tx: mpsc::UnboundedSender<TimerFired>,
    timer_rx: mpsc::UnboundedReceiver<TimerFired>,
}

impl Supervisor {
    /// Creates a supervisor with the given config, spawn collaborator, and
    /// subscribers.
    pub fn new(
        cfg: Config,
        spawner: Arc<dyn Spawner>,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        Self {
            cfg,
            bus,
            subs: Arc::new(SubscriberSet::new(subscribers)),
            spawner,
            table: HashMap::new(),
            running: false,
            cmd_tx,
            cmd_rx,
            exit_tx,
            exit_rx,
            timer_tx,
            timer_rx,
        }
    }

    /// Returns a cloneable command handle for this supervisor.
    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle::new(self.cmd_tx.clone())
    }

    /// Runs the supervisor loop until [`SupervisorHandle::shutdown`] is
    /// called or every handle is dropped.
    pub async fn run(mut self) {
        self.subscriber_listener();
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Shutdown { reply }) => {
                        self.deactivate();
                        let _ = reply.send(());
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        self.deactivate();
                        break;
                    }
                },
                Some(notice) = self.exit_rx.recv() => self.on_process_exited(notice),
                Some(fired) = self.timer_rx.recv() => self.on_timer(fired),
            }
        }
    }

    /// Forwards bus events to the subscriber set (fire-and-forget).
    fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            use tokio::sync::broadcast::error::RecvError;
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.dispatch(&ev).await,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Add { name, spec, reply } => {
                let _ = reply.send(self.add_process(name, spec));
            }
            Command::Remove { name, reply } => {
                let _ = reply.send(self.remove_process(&name));
            }
            Command::Activate { reply } => {
                self.activate();
                let _ = reply.send(());
            }
            Command::Deactivate { reply } => {
                self.deactivate();
                let _ = reply.send(());
            }
            Command::StartProcess { name, reply } => {
                let _ = reply.send(self.start_process(&name));
            }
            Command::StopProcess { name, reply } => {
                let _ = reply.send(self.stop_process(&name));
            }
            Command::RestartAll { reply } => {
                self.restart_all();
                let _ = reply.send(());
            }
            // Handled in `run` so the loop can break.
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn add_process(&mut self, name: String, spec: ProcessSpec) -> Result<(), SupervisorError> {
        if self.table.contains_key(name.as_str()) {
            return Err(SupervisorError::DuplicateName { name });
        }
        let name: Arc<str> = name.into();
        self.table.insert(
            name.clone(),
            ProcEntry::new(name.clone(), spec, self.cfg.min_restart_delay),
        );
        self.bus
            .publish(Event::now(EventKind::ProcessAdded).with_process(name.clone()));
        if self.running {
            self.spawn_if_idle(&name);
        }
        Ok(())
    }

    fn remove_process(&mut self, name: &str) -> Result<(), SupervisorError> {
        let Some(mut entry) = self.table.remove(name) else {
            return Err(SupervisorError::UnknownName {
                name: name.to_owned(),
            });
        };
        entry.cancel_restart_timer();
        entry.cancel_kill_timer();
        if let Some(handle) = entry.live.take() {
            // Best-effort TERM; the exit is not awaited and the escalation
            // timer dies with the entry.
            let _ = handle.signal(Signal::Term);
        }
        self.bus
            .publish(Event::now(EventKind::ProcessRemoved).with_process(entry.name));
        Ok(())
    }

    fn activate(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.bus.publish(Event::now(EventKind::SupervisorStarted));
        for name in self.names() {
            self.spawn_if_idle(&name);
        }
    }

    fn deactivate(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        // Cancel outstanding restarts first: nothing may be relaunched once
        // shutdown has begun.
        for entry in self.table.values_mut() {
            entry.cancel_restart_timer();
        }
        for name in self.names() {
            self.term_process(&name);
        }
        self.bus.publish(Event::now(EventKind::SupervisorStopped));
    }

    fn start_process(&mut self, name: &str) -> Result<(), SupervisorError> {
        if !self.table.contains_key(name) {
            return Err(SupervisorError::UnknownName {
                name: name.to_owned(),
            });
        }
        self.spawn_if_idle(name);
        Ok(())
    }

    fn stop_process(&mut self, name: &str) -> Result<(), SupervisorError> {
        if !self.table.contains_key(name) {
            return Err(SupervisorError::UnknownName {
                name: name.to_owned(),
            });
        }
        self.term_process(name);
        Ok(())
    }

    fn restart_all(&mut self) {
        // Only stops; the exit-driven restart path relaunches each process.
        for name in self.names() {
            self.term_process(&name);
        }
    }

    /// Spawns the named process unless one is already live or the
    /// supervisor is inactive.
    fn spawn_if_idle(&mut self, name: &str) {
        if !self.running {
            return;
        }
        let Some(entry) = self.table.get(name) else {
            return;
        };
        if entry.live.is_some() {
            return;
        }
        let key = entry.name.clone();
        let spec = entry.spec.clone();

        let logger = LineLogger::new(key.clone(), self.bus.clone());
        let notifier = ExitNotifier::new(key.clone(), self.exit_tx.clone());
        match self.spawner.spawn(&spec, logger, notifier) {
            Ok(handle) => {
                let pid = handle.pid();
                if let Some(entry) = self.table.get_mut(name) {
                    entry.started_at = Some(Instant::now());
                    entry.live = Some(handle);
                }
                let mut ev = Event::now(EventKind::ProcessStarted).with_process(key);
                if let Some(pid) = pid {
                    ev = ev.with_pid(pid);
                }
                self.bus.publish(ev);
            }
            Err(err) => {
                // "Won't start" and "crashes immediately" share one policy:
                // record the attempt and route it through the exit path.
                if let Some(entry) = self.table.get_mut(name) {
                    entry.started_at = Some(Instant::now());
                }
                self.bus.publish(
                    Event::now(EventKind::SpawnFailed)
                        .with_process(key.clone())
                        .with_reason(err.to_string()),
                );
                let _ = self.exit_tx.send(ExitNotice {
                    name: key,
                    reason: ExitReason::SpawnFailed,
                });
            }
        }
    }

    /// Sends TERM to the named process and arms the kill escalation.
    fn term_process(&mut self, name: &str) {
        let Some(entry) = self.table.get_mut(name) else {
            return;
        };
        let Some(handle) = entry.live.as_ref() else {
            return;
        };
        match handle.signal(Signal::Term) {
            Ok(()) => {
                let token = arm_timer(
                    self.timer_tx.clone(),
                    entry.name.clone(),
                    TimerKind::Kill,
                    self.cfg.kill_time,
                );
                entry.kill_timer = Some(token);
                self.bus
                    .publish(Event::now(EventKind::StopRequested).with_process(entry.name.clone()));
            }
            // The process beat us to it; its exit notice is on the way.
            Err(SignalError::AlreadyExited) => {}
            Err(err) => {
                self.bus.publish(
                    Event::now(EventKind::StopRequested)
                        .with_process(entry.name.clone())
                        .with_reason(err.to_string()),
                );
            }
        }
    }

    /// Handles a child's termination: clears runtime state, applies the
    /// backoff law, and schedules the restart when active.
    fn on_process_exited(&mut self, notice: ExitNotice) {
        self.bus.publish(
            Event::now(EventKind::ProcessExited)
                .with_process(notice.name.clone())
                .with_reason(notice.reason.to_string()),
        );
        // The name may have been removed while the notice was in flight.
        let Some(entry) = self.table.get_mut(&*notice.name) else {
            return;
        };
        // The exit the escalation was waiting for has happened.
        entry.cancel_kill_timer();
        entry.live = None;

        let ran_for = entry
            .started_at
            .take()
            .map(|t| t.elapsed())
            .unwrap_or_default();
        let decision = self.cfg.backoff().decide(entry.delay, ran_for);
        entry.delay = decision.next_delay;

        if self.running {
            let token = arm_timer(
                self.timer_tx.clone(),
                entry.name.clone(),
                TimerKind::Restart,
                decision.restart_in,
            );
            entry.restart_timer = Some(token);
            self.bus.publish(
                Event::now(EventKind::RestartScheduled)
                    .with_process(entry.name.clone())
                    .with_delay(decision.restart_in),
            );
        }
    }

    fn on_timer(&mut self, fired: TimerFired) {
        // Cancelled after queueing: the condition this timer guarded is
        // moot.
        if fired.token.is_cancelled() {
            return;
        }
        match fired.kind {
            TimerKind::Restart => {
                let Some(entry) = self.table.get_mut(&*fired.name) else {
                    return;
                };
                entry.restart_timer = None;
                self.spawn_if_idle(&fired.name);
            }
            TimerKind::Kill => {
                let Some(entry) = self.table.get_mut(&*fired.name) else {
                    return;
                };
                entry.kill_timer = None;
                if let Some(handle) = entry.live.as_ref() {
                    // AlreadyExited here is the same benign race as on TERM.
                    if handle.signal(Signal::Kill).is_ok() {
                        self.bus.publish(
                            Event::now(EventKind::KillEscalated).with_process(fired.name.clone()),
                        );
                    }
                }
            }
        }
    }

    fn names(&self) -> Vec<Arc<str>> {
        self.table.keys().cloned().collect()
    }
}

/// Arms a cancellable timer that re-enters the loop as a [`TimerFired`]
/// message.
fn arm_timer(
    tx: mpsc::UnboundedSender<TimerFired>,
    name: Arc<str>,
    kind: TimerKind,
    delay: Duration,
) -> CancellationToken {
    let token = CancellationToken::new();
    let fired = TimerFired {
        name,
        kind,
        token: token.clone(),
    };
    let guard = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = time::sleep(delay) => { let _ = tx.send(fired); }
            _ = guard.cancelled() => {}
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpawnError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::broadcast::Receiver;

    /// One recorded spawn: the scripted handle state plus the notifier the
    /// test uses to simulate the exit.
    struct SpawnRecord {
        name: String,
        signals: Arc<Mutex<Vec<Signal>>>,
        exited: Arc<AtomicBool>,
        notifier: Option<ExitNotifier>,
    }

    #[derive(Debug)]
    struct FakeHandle {
        signals: Arc<Mutex<Vec<Signal>>>,
        exited: Arc<AtomicBool>,
    }

    impl ProcessHandle for FakeHandle {
        fn pid(&self) -> Option<u32> {
            Some(4242)
        }

        fn signal(&self, sig: Signal) -> Result<(), SignalError> {
            if self.exited.load(Ordering::SeqCst) {
                return Err(SignalError::AlreadyExited);
            }
            self.signals.lock().unwrap().push(sig);
            Ok(())
        }
    }

    /// Scripted spawner: programs named `fail` refuse to launch; everything
    /// else gets a recorded fake handle.
    #[derive(Default)]
    struct FakeSpawner {
        spawns: Mutex<Vec<SpawnRecord>>,
    }

    impl FakeSpawner {
        fn spawn_count(&self) -> usize {
            self.spawns.lock().unwrap().len()
        }

        fn signals(&self, idx: usize) -> Vec<Signal> {
            self.spawns.lock().unwrap()[idx].signals.lock().unwrap().clone()
        }

        /// Simulates the child at `idx` terminating.
        fn exit(&self, idx: usize, reason: ExitReason) {
            let (exited, notifier) = {
                let mut spawns = self.spawns.lock().unwrap();
                let rec = &mut spawns[idx];
                (rec.exited.clone(), rec.notifier.take().expect("already exited"))
            };
            exited.store(true, Ordering::SeqCst);
            notifier.notify(reason);
        }
    }

    impl Spawner for FakeSpawner {
        fn spawn(
            &self,
            spec: &ProcessSpec,
            _logger: LineLogger,
            notifier: ExitNotifier,
        ) -> Result<Box<dyn ProcessHandle>, SpawnError> {
            if spec.program() == "fail" {
                return Err(SpawnError::Launch {
                    command: spec.program().to_owned(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            let signals = Arc::new(Mutex::new(Vec::new()));
            let exited = Arc::new(AtomicBool::new(false));
            self.spawns.lock().unwrap().push(SpawnRecord {
                name: notifier.name().to_owned(),
                signals: signals.clone(),
                exited: exited.clone(),
                notifier: Some(notifier),
            });
            Ok(Box::new(FakeHandle { signals, exited }))
        }
    }

    fn test_config() -> Config {
        Config {
            threshold: Duration::from_secs(1),
            min_restart_delay: Duration::from_secs(1),
            max_restart_delay: Duration::from_secs(60),
            kill_time: Duration::from_secs(5),
            bus_capacity: 256,
        }
    }

    /// Boots a supervisor on the current (paused) runtime and returns the
    /// pieces the tests drive it with.
    fn boot(cfg: Config) -> (SupervisorHandle, Arc<FakeSpawner>, Receiver<Event>) {
        let spawner = Arc::new(FakeSpawner::default());
        let sup = Supervisor::new(cfg, spawner.clone(), Vec::new());
        let handle = sup.handle();
        let events = sup.bus.subscribe();
        tokio::spawn(sup.run());
        (handle, spawner, events)
    }

    /// Awaits the next event of the wanted kind, skipping others.
    async fn next_event(rx: &mut Receiver<Event>, kind: EventKind) -> Event {
        loop {
            let ev = rx.recv().await.expect("bus closed");
            if ev.kind == kind {
                return ev;
            }
        }
    }

    fn spec() -> ProcessSpec {
        ProcessSpec::new("/srv/web").with_args(["--port", "8080"])
    }

    #[tokio::test(start_paused = true)]
    async fn add_does_not_spawn_until_supervisor_starts() {
        let (handle, spawner, _events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        assert_eq!(spawner.spawn_count(), 0);

        handle.start().await.unwrap();
        assert_eq!(spawner.spawn_count(), 1);
        assert_eq!(spawner.spawns.lock().unwrap()[0].name, "web");
    }

    #[tokio::test(start_paused = true)]
    async fn add_while_active_spawns_immediately() {
        let (handle, spawner, _events) = boot(test_config());
        handle.start().await.unwrap();
        handle.add_process("web", spec()).await.unwrap();
        assert_eq!(spawner.spawn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_name_is_rejected() {
        let (handle, _spawner, _events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        let err = handle.add_process("web", spec()).await.unwrap_err();
        assert!(matches!(err, SupervisorError::DuplicateName { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_names_are_rejected() {
        let (handle, _spawner, _events) = boot(test_config());
        assert!(matches!(
            handle.remove_process("ghost").await.unwrap_err(),
            SupervisorError::UnknownName { .. }
        ));
        assert!(matches!(
            handle.stop_process("ghost").await.unwrap_err(),
            SupervisorError::UnknownName { .. }
        ));
        assert!(matches!(
            handle.start_process("ghost").await.unwrap_err(),
            SupervisorError::UnknownName { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_produces_exactly_one_spawn() {
        let (handle, spawner, _events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();
        handle.start_process("web").await.unwrap();
        handle.start_process("web").await.unwrap();
        assert_eq!(spawner.spawn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_exits_back_off_1_2_4_then_healthy_run_resets() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        // Three instant deaths: scheduled delays double from the minimum.
        for (i, expected_ms) in [(0, 1000), (1, 2000), (2, 4000)] {
            spawner.exit(i, ExitReason::Exited { code: 1 });
            let ev = next_event(&mut events, EventKind::RestartScheduled).await;
            assert_eq!(ev.delay_ms, Some(expected_ms), "restart #{i}");
            next_event(&mut events, EventKind::ProcessStarted).await;
        }
        assert_eq!(spawner.spawn_count(), 4);

        // A run reaching the threshold restarts immediately and resets.
        time::advance(Duration::from_secs(2)).await;
        spawner.exit(3, ExitReason::Exited { code: 0 });
        let ev = next_event(&mut events, EventKind::RestartScheduled).await;
        assert_eq!(ev.delay_ms, Some(0));
        next_event(&mut events, EventKind::ProcessStarted).await;

        // The next instant death starts the ladder from the minimum again.
        spawner.exit(4, ExitReason::Exited { code: 1 });
        let ev = next_event(&mut events, EventKind::RestartScheduled).await;
        assert_eq!(ev.delay_ms, Some(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_caps_at_max_restart_delay() {
        let cfg = Config {
            max_restart_delay: Duration::from_secs(4),
            ..test_config()
        };
        let (handle, spawner, mut events) = boot(cfg);
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        let mut seen = Vec::new();
        for i in 0..5 {
            spawner.exit(i, ExitReason::Exited { code: 1 });
            let ev = next_event(&mut events, EventKind::RestartScheduled).await;
            seen.push(ev.delay_ms.unwrap());
            next_event(&mut events, EventKind::ProcessStarted).await;
        }
        assert_eq!(seen, vec![1000, 2000, 4000, 4000, 4000]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_restarts() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        spawner.exit(0, ExitReason::Exited { code: 1 });
        next_event(&mut events, EventKind::RestartScheduled).await;

        handle.stop().await.unwrap();
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(spawner.spawn_count(), 1, "no respawn after deactivation");
    }

    #[tokio::test(start_paused = true)]
    async fn exit_while_inactive_schedules_nothing() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        handle.stop().await.unwrap();
        // TERM was sent on deactivation; the exit lands while inactive.
        assert_eq!(spawner.signals(0), vec![Signal::Term]);
        spawner.exit(0, ExitReason::Signaled { signal: 15 });
        next_event(&mut events, EventKind::ProcessExited).await;

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(spawner.spawn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_process_escalates_to_kill_after_kill_time() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        handle.stop_process("web").await.unwrap();
        assert_eq!(spawner.signals(0), vec![Signal::Term]);

        next_event(&mut events, EventKind::KillEscalated).await;
        assert_eq!(spawner.signals(0), vec![Signal::Term, Signal::Kill]);
    }

    #[tokio::test(start_paused = true)]
    async fn kill_timer_is_cancelled_when_the_exit_arrives_first() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        handle.stop_process("web").await.unwrap();
        spawner.exit(0, ExitReason::Signaled { signal: 15 });
        next_event(&mut events, EventKind::ProcessExited).await;

        // Past the kill window: the escalation must not have fired. (The
        // fast-exit restart respawned a new instance; the first one only
        // ever saw TERM.)
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(spawner.signals(0), vec![Signal::Term]);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_an_already_dead_process_swallows_the_race() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        // Dead, but the notice has not been processed yet.
        spawner.exit(0, ExitReason::Exited { code: 0 });
        handle.stop_process("web").await.unwrap();
        assert_eq!(spawner.signals(0), Vec::<Signal>::new());

        // No escalation ever fires for it.
        next_event(&mut events, EventKind::ProcessExited).await;
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(spawner.signals(0), Vec::<Signal>::new());
    }

    #[tokio::test(start_paused = true)]
    async fn remove_cancels_a_pending_restart() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle.start().await.unwrap();

        spawner.exit(0, ExitReason::Exited { code: 1 });
        next_event(&mut events, EventKind::RestartScheduled).await;

        handle.remove_process("web").await.unwrap();
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(spawner.spawn_count(), 1, "removed name never respawns");

        // The name is free again.
        handle.add_process("web", spec()).await.unwrap();
        assert_eq!(spawner.spawn_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_failure_follows_the_backoff_path() {
        let (handle, _spawner, mut events) = boot(test_config());
        handle
            .add_process("broken", ProcessSpec::new("fail"))
            .await
            .unwrap();
        handle.start().await.unwrap();

        next_event(&mut events, EventKind::SpawnFailed).await;
        let ev = next_event(&mut events, EventKind::RestartScheduled).await;
        assert_eq!(ev.delay_ms, Some(1000));

        // Still failing: the next attempt is pushed out further.
        next_event(&mut events, EventKind::SpawnFailed).await;
        let ev = next_event(&mut events, EventKind::RestartScheduled).await;
        assert_eq!(ev.delay_ms, Some(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_all_terms_everything_and_lets_exits_drive_restarts() {
        let (handle, spawner, mut events) = boot(test_config());
        handle.add_process("web", spec()).await.unwrap();
        handle
            .add_process("worker", ProcessSpec::new("/srv/worker"))
            .await
            .unwrap();
        handle.start().await.unwrap();
        assert_eq!(spawner.spawn_count(), 2);

        handle.restart_all().await.unwrap();
        assert_eq!(spawner.signals(0), vec![Signal::Term]);
        assert_eq!(spawner.signals(1), vec![Signal::Term]);

        spawner.exit(0, ExitReason::Signaled { signal: 15 });
        spawner.exit(1, ExitReason::Signaled { signal: 15 });
        next_event(&mut events, EventKind::ProcessStarted).await;
        next_event(&mut events, EventKind::ProcessStarted).await;
        assert_eq!(spawner.spawn_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_the_handle() {
        let (handle, _spawner, _events) = boot(test_config());
        handle.shutdown().await.unwrap();
        let err = handle.add_process("web", spec()).await.unwrap_err();
        assert!(matches!(err, SupervisorError::Closed));
    }
}
