//! The supervisor: one-shot lifecycle operations and the watch loop.
//!
//! Everything runs on the caller's thread. Within a tick containers are
//! processed one at a time in name order, so a slow runtime invocation
//! delays the rest of that tick.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dockwatch_common::config::SupervisorConfig;
use dockwatch_common::constants::SHUTDOWN_CHECK_MILLIS;
use dockwatch_common::error::{DockwatchError, Result};
use dockwatch_common::types::RuntimeId;

use crate::client::{ContainerRuntime, InspectOutcome};
use crate::container::{ContainerRuntimeState, ContainerSet, ContainerSpec, RunningInstance};
use crate::policy::{self, Action, Decision, Observation, Transition};
use crate::state::HandleStore;

/// Cooperative cancellation for [`Supervisor::watch`].
///
/// Clones share the same flag, so a signal handler can hold one clone
/// while the loop polls another.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    raised: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Creates a signal that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Returns whether shutdown was requested.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` if the full duration elapsed without a request. A
    /// duration too large to form a deadline sleeps until shutdown.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let slice = Duration::from_millis(SHUTDOWN_CHECK_MILLIS);
        loop {
            if self.is_raised() {
                return false;
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => slice,
            };
            if remaining.is_zero() {
                return true;
            }
            std::thread::sleep(slice.min(remaining));
        }
    }
}

/// Result of a successful start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new instance was launched.
    Started(RunningInstance),
    /// An instance was already running; nothing was launched.
    AlreadyRunning(RunningInstance),
}

impl StartOutcome {
    /// The running instance either way.
    #[must_use]
    pub const fn instance(&self) -> &RunningInstance {
        match self {
            Self::Started(instance) | Self::AlreadyRunning(instance) => instance,
        }
    }
}

/// Result of a successful stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A running instance was removed.
    Stopped,
    /// Nothing was running.
    NotRunning,
}

/// Per-container results of the autostart pass.
#[derive(Debug, Default)]
pub struct AutostartReport {
    /// Containers that are now running.
    pub started: Vec<(String, StartOutcome)>,
    /// Containers whose start failed.
    pub failed: Vec<(String, DockwatchError)>,
}

/// What one tick observed and did for one container.
#[derive(Debug)]
pub struct TickEntry {
    /// Container name.
    pub name: String,
    /// Running flag observed before any action.
    pub running: bool,
    /// Policy decision.
    pub decision: Decision,
    /// The action that failed, if any.
    pub error: Option<DockwatchError>,
}

/// Outcome of one pass over the managed set, in name order.
#[derive(Debug, Default)]
pub struct TickReport {
    /// One entry per managed container.
    pub entries: Vec<TickEntry>,
}

impl TickReport {
    /// Looks up the entry for `name`.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&TickEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries whose actions failed.
    pub fn failures(&self) -> impl Iterator<Item = &TickEntry> {
        self.entries.iter().filter(|e| e.error.is_some())
    }
}

/// One row of [`Supervisor::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerListing {
    /// Container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// The live instance, if running.
    pub instance: Option<RunningInstance>,
}

impl ContainerListing {
    /// Time the instance has been running at `now`.
    #[must_use]
    pub fn uptime(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.instance.as_ref().map(|i| i.age(now))
    }
}

#[derive(Debug, Default)]
struct Tracking {
    previous_running: Option<bool>,
    last_known_id: Option<RuntimeId>,
}

/// Owns the managed set and drives it through a container runtime.
#[derive(Debug)]
pub struct Supervisor<R> {
    containers: ContainerSet,
    runtime: R,
    handles: HandleStore,
    poll_interval: Duration,
    tracked: BTreeMap<String, Tracking>,
}

impl<R: ContainerRuntime> Supervisor<R> {
    /// Creates a supervisor over `containers`.
    #[must_use]
    pub fn new(containers: ContainerSet, runtime: R, config: &SupervisorConfig) -> Self {
        Self {
            containers,
            runtime,
            handles: HandleStore::new(config.marker_dir.clone()),
            poll_interval: config.poll_interval,
            tracked: BTreeMap::new(),
        }
    }

    /// The managed set.
    #[must_use]
    pub const fn containers(&self) -> &ContainerSet {
        &self.containers
    }

    /// The runtime client.
    #[must_use]
    pub const fn runtime(&self) -> &R {
        &self.runtime
    }

    /// The handle marker store.
    #[must_use]
    pub const fn handles(&self) -> &HandleStore {
        &self.handles
    }

    /// Running flag recorded at the end of the last tick.
    #[must_use]
    pub fn previous_running(&self, name: &str) -> Option<bool> {
        self.tracked.get(name).and_then(|t| t.previous_running)
    }

    /// Identifier of the instance this supervisor last launched or saw.
    #[must_use]
    pub fn last_known_id(&self, name: &str) -> Option<&RuntimeId> {
        self.tracked.get(name).and_then(|t| t.last_known_id.as_ref())
    }

    /// Inspects a container.
    ///
    /// # Errors
    ///
    /// Returns [`DockwatchError::UnknownContainer`] for an unregistered name.
    pub fn inspect(&self, name: &str) -> Result<ContainerRuntimeState> {
        let spec = self.containers.get(name)?;
        Ok(self.runtime.inspect(spec).to_state())
    }

    /// Starts a container unless it is already running.
    ///
    /// # Errors
    ///
    /// Returns [`DockwatchError::UnknownContainer`] for an unregistered
    /// name, or the runtime/marker error that aborted the start.
    pub fn start(&mut self, name: &str) -> Result<StartOutcome> {
        let spec = self.containers.get(name)?;
        let tracking = self.tracked.entry(spec.name().to_owned()).or_default();
        start_container(&self.runtime, &self.handles, spec, tracking)
    }

    /// Stops a container and forgets that we started it.
    ///
    /// The handle marker is removed before the runtime is asked to stop,
    /// so a failed stop never triggers crash recovery.
    ///
    /// # Errors
    ///
    /// Returns [`DockwatchError::UnknownContainer`] for an unregistered
    /// name, or the runtime/marker error that aborted the stop.
    pub fn stop(&mut self, name: &str) -> Result<StopOutcome> {
        let spec = self.containers.get(name)?;
        stop_container(&self.runtime, &self.handles, spec)
    }

    /// Stops then starts a container.
    ///
    /// The two steps are not atomic: if the process dies in between, the
    /// container stays stopped and its marker is gone.
    ///
    /// # Errors
    ///
    /// Returns the first error of either step.
    pub fn restart(&mut self, name: &str) -> Result<StartOutcome> {
        let _ = self.stop(name)?;
        self.start(name)
    }

    /// Starts every container declared with `autostart`.
    ///
    /// A failure is recorded and the pass continues with the next container.
    pub fn autostart(&mut self) -> AutostartReport {
        let mut report = AutostartReport::default();
        for spec in self.containers.iter().filter(|s| s.autostart()) {
            let tracking = self.tracked.entry(spec.name().to_owned()).or_default();
            match start_container(&self.runtime, &self.handles, spec, tracking) {
                Ok(outcome) => report.started.push((spec.name().to_owned(), outcome)),
                Err(e) => {
                    tracing::error!(container = spec.name(), error = %e, "autostart failed");
                    report.failed.push((spec.name().to_owned(), e));
                }
            }
        }
        report
    }

    /// Inspects every container, in name order.
    pub fn list(&self) -> Vec<ContainerListing> {
        self.containers
            .iter()
            .map(|spec| ContainerListing {
                name: spec.name().to_owned(),
                image: spec.image().to_owned(),
                instance: self.runtime.inspect(spec).to_state().instance().cloned(),
            })
            .collect()
    }

    /// Runs one polling pass over the managed set.
    ///
    /// Failed actions are logged and reported; they never stop the pass.
    pub fn tick(&mut self) -> TickReport {
        let now = Utc::now();
        let mut report = TickReport::default();
        for spec in self.containers.iter() {
            let tracking = self.tracked.entry(spec.name().to_owned()).or_default();
            let entry = tick_container(&self.runtime, &self.handles, spec, tracking, now);
            report.entries.push(entry);
        }
        report
    }

    /// Runs the autostart pass, then ticks every poll interval until
    /// `shutdown` is raised. Returns the number of completed ticks.
    pub fn watch(&mut self, shutdown: &ShutdownSignal) -> u64 {
        let initial = self.autostart();
        tracing::info!(
            started = initial.started.len(),
            failed = initial.failed.len(),
            interval = ?self.poll_interval,
            "watching containers"
        );

        let mut ticks = 0;
        while shutdown.sleep(self.poll_interval) {
            let report = self.tick();
            ticks += 1;
            tracing::trace!(tick = ticks, failures = report.failures().count(), "tick complete");
        }
        tracing::info!(ticks, "watch stopped");
        ticks
    }
}

fn start_container<R: ContainerRuntime>(
    runtime: &R,
    handles: &HandleStore,
    spec: &ContainerSpec,
    tracking: &mut Tracking,
) -> Result<StartOutcome> {
    match runtime.inspect(spec) {
        InspectOutcome::Running(instance) => {
            tracing::info!(container = spec.name(), runtime_id = %instance.id, "container is already running");
            tracking.last_known_id = Some(instance.id.clone());
            return Ok(StartOutcome::AlreadyRunning(instance));
        }
        InspectOutcome::Exited(stale) => {
            tracing::info!(container = spec.name(), runtime_id = %stale.id, "removing exited instance before start");
            runtime.remove(spec)?;
        }
        InspectOutcome::Unparseable { .. } | InspectOutcome::Failed { .. } => {}
    }

    let id = runtime.run(spec)?;
    let instance = RunningInstance {
        id,
        created_at: Utc::now(),
    };
    handles.save(spec, &instance.id)?;
    tracking.last_known_id = Some(instance.id.clone());
    tracing::info!(container = spec.name(), runtime_id = %instance.id, image = spec.image(), "container started");
    Ok(StartOutcome::Started(instance))
}

fn stop_container<R: ContainerRuntime>(
    runtime: &R,
    handles: &HandleStore,
    spec: &ContainerSpec,
) -> Result<StopOutcome> {
    handles.delete(spec)?;
    match runtime.inspect(spec) {
        InspectOutcome::Running(instance) => {
            runtime.remove(spec)?;
            tracing::info!(container = spec.name(), runtime_id = %instance.id, "container stopped");
            Ok(StopOutcome::Stopped)
        }
        InspectOutcome::Exited(stale) => {
            runtime.remove(spec)?;
            tracing::info!(container = spec.name(), runtime_id = %stale.id, "container is not running, removed exited instance");
            Ok(StopOutcome::NotRunning)
        }
        InspectOutcome::Unparseable { .. } | InspectOutcome::Failed { .. } => {
            tracing::info!(container = spec.name(), "container is not running");
            Ok(StopOutcome::NotRunning)
        }
    }
}

fn tick_container<R: ContainerRuntime>(
    runtime: &R,
    handles: &HandleStore,
    spec: &ContainerSpec,
    tracking: &mut Tracking,
    now: DateTime<Utc>,
) -> TickEntry {
    let current = runtime.inspect(spec).to_state();
    let observation = Observation {
        spec,
        previous_running: tracking.previous_running,
        current: &current,
        handle_exists: handles.exists(spec),
        now,
    };

    match observation.transition() {
        Some(Transition::WentDown) => tracing::warn!(container = spec.name(), "container stopped unexpectedly"),
        Some(Transition::CameUp) => tracing::info!(container = spec.name(), "container is running"),
        None => {}
    }
    if let Some(instance) = current.instance() {
        tracking.last_known_id = Some(instance.id.clone());
    }

    let decision = policy::decide(&observation);
    match decision {
        Decision::Expire { .. } => {
            tracing::info!(container = spec.name(), limit = ?spec.max_lifetime(), "stopping container after lifetime limit");
        }
        Decision::Recover => tracing::info!(container = spec.name(), "restarting crashed container"),
        Decision::Idle => {}
    }

    let mut error = None;
    for action in decision.actions() {
        let result = match action {
            Action::Stop => stop_container(runtime, handles, spec).map(|_| ()),
            Action::Start => start_container(runtime, handles, spec, tracking).map(|_| ()),
        };
        if let Err(e) = result {
            tracing::warn!(container = spec.name(), ?action, error = %e, "lifecycle action failed");
            error = Some(e);
            break;
        }
    }

    tracking.previous_running = Some(current.is_running());
    TickEntry {
        name: spec.name().to_owned(),
        running: current.is_running(),
        decision,
        error,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::TimeDelta;

    use super::*;
    use crate::container::ContainerOptions;

    /// In-memory runtime that counts invocations.
    #[derive(Debug, Default)]
    struct FakeRuntime {
        live: RefCell<BTreeMap<String, RunningInstance>>,
        exited: RefCell<BTreeMap<String, RunningInstance>>,
        runs: RefCell<Vec<String>>,
        removes: RefCell<Vec<String>>,
        inspects: RefCell<usize>,
        fail_runs: bool,
        fail_removes: Cell<bool>,
        stop_after_inspects: Option<(usize, ShutdownSignal)>,
    }

    impl FakeRuntime {
        fn seed(&self, name: &str, age: TimeDelta) {
            let _ = self.live.borrow_mut().insert(
                name.to_owned(),
                RunningInstance {
                    id: RuntimeId::new(format!("seed-{name}")),
                    created_at: Utc::now() - age,
                },
            );
        }

        fn kill(&self, name: &str) {
            let _ = self.live.borrow_mut().remove(name);
        }

        /// The instance exits but stays registered under its name.
        fn crash(&self, name: &str) {
            if let Some(instance) = self.live.borrow_mut().remove(name) {
                let _ = self.exited.borrow_mut().insert(name.to_owned(), instance);
            }
        }

        fn runs(&self) -> Vec<String> {
            self.runs.borrow().clone()
        }
    }

    impl ContainerRuntime for FakeRuntime {
        fn run(&self, spec: &ContainerSpec) -> Result<RuntimeId> {
            if self.fail_runs {
                return Err(DockwatchError::RuntimeInvocation {
                    program: "fake".into(),
                    status: "exit status: 125".into(),
                    output: "no such image".into(),
                });
            }
            self.runs.borrow_mut().push(spec.name().to_owned());
            let id = RuntimeId::new(format!("{}-{}", spec.name(), self.runs.borrow().len()));
            let _ = self.live.borrow_mut().insert(
                spec.name().to_owned(),
                RunningInstance {
                    id: id.clone(),
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        }

        fn remove(&self, spec: &ContainerSpec) -> Result<()> {
            if self.fail_removes.get() {
                return Err(DockwatchError::RuntimeInvocation {
                    program: "fake".into(),
                    status: "exit status: 1".into(),
                    output: "removal in progress".into(),
                });
            }
            self.removes.borrow_mut().push(spec.name().to_owned());
            let _ = self.live.borrow_mut().remove(spec.name());
            let _ = self.exited.borrow_mut().remove(spec.name());
            Ok(())
        }

        fn inspect(&self, spec: &ContainerSpec) -> InspectOutcome {
            *self.inspects.borrow_mut() += 1;
            if let Some((limit, signal)) = &self.stop_after_inspects {
                if *self.inspects.borrow() >= *limit {
                    signal.raise();
                }
            }
            if let Some(instance) = self.live.borrow().get(spec.name()) {
                return InspectOutcome::Running(instance.clone());
            }
            self.exited.borrow().get(spec.name()).cloned().map_or_else(
                || InspectOutcome::Failed {
                    reason: "No such object".into(),
                },
                InspectOutcome::Exited,
            )
        }
    }

    fn container_set(specs: &[(&str, bool, bool, Option<&str>)]) -> ContainerSet {
        let mut set = ContainerSet::new();
        for (name, autostart, autorestart, life) in specs {
            let options = ContainerOptions {
                autostart: *autostart,
                autorestart: *autorestart,
                life: life.map(str::to_owned),
                ..ContainerOptions::default()
            };
            let _ = set.insert(ContainerSpec::new(*name, "nginx", options).unwrap());
        }
        set
    }

    fn supervisor(
        specs: &[(&str, bool, bool, Option<&str>)],
        runtime: FakeRuntime,
        dir: &tempfile::TempDir,
    ) -> Supervisor<FakeRuntime> {
        let config = SupervisorConfig::default()
            .with_marker_dir(dir.path())
            .with_poll_interval(Duration::from_millis(1));
        Supervisor::new(container_set(specs), runtime, &config)
    }

    #[test]
    fn start_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);

        assert!(matches!(sup.start("web").unwrap(), StartOutcome::Started(_)));
        assert!(matches!(sup.start("web").unwrap(), StartOutcome::AlreadyRunning(_)));
        assert_eq!(sup.runtime().runs(), vec!["web"]);
        assert_eq!(sup.last_known_id("web"), Some(&RuntimeId::new("web-1")));
    }

    #[test]
    fn start_writes_marker_with_runtime_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();

        let spec = sup.containers().get("web").unwrap();
        assert_eq!(sup.handles().load(spec).unwrap(), Some(RuntimeId::new("web-1")));
    }

    #[test]
    fn stop_then_inspect_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();

        assert_eq!(sup.stop("web").unwrap(), StopOutcome::Stopped);
        assert_eq!(sup.inspect("web").unwrap(), ContainerRuntimeState::NotRunning);
        assert!(!sup.handles().exists(sup.containers().get("web").unwrap()));
    }

    #[test]
    fn stop_of_vanished_container_still_clears_marker() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();
        sup.runtime().kill("web");

        assert_eq!(sup.stop("web").unwrap(), StopOutcome::NotRunning);
        assert!(!sup.handles().exists(sup.containers().get("web").unwrap()));
        assert!(sup.runtime().removes.borrow().is_empty());
    }

    #[test]
    fn unknown_names_fail_one_shot_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        assert!(matches!(sup.start("db"), Err(DockwatchError::UnknownContainer { .. })));
        assert!(matches!(sup.stop("db"), Err(DockwatchError::UnknownContainer { .. })));
        assert!(matches!(sup.restart("db"), Err(DockwatchError::UnknownContainer { .. })));
        assert!(matches!(sup.inspect("db"), Err(DockwatchError::UnknownContainer { .. })));
    }

    #[test]
    fn restart_replaces_the_instance() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();

        let outcome = sup.restart("web").unwrap();
        assert_eq!(outcome.instance().id, RuntimeId::new("web-2"));
        assert_eq!(*sup.runtime().removes.borrow(), vec!["web"]);
        assert!(sup.handles().exists(sup.containers().get("web").unwrap()));
    }

    #[test]
    fn autostart_only_touches_flagged_containers() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(
            &[("api", true, true, None), ("batch", false, true, None), ("web", true, false, None)],
            FakeRuntime::default(),
            &dir,
        );
        let report = sup.autostart();
        assert_eq!(report.started.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(sup.runtime().runs(), vec!["api", "web"]);
    }

    #[test]
    fn autostart_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime {
            fail_runs: true,
            ..FakeRuntime::default()
        };
        let mut sup = supervisor(&[("api", true, true, None), ("web", true, true, None)], runtime, &dir);
        let report = sup.autostart();
        assert!(report.started.is_empty());
        let failed: Vec<_> = report.failed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(failed, vec!["api", "web"]);
    }

    #[test]
    fn tick_recovers_crashed_container_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();
        let first = sup.tick();
        assert_eq!(first.entry("web").unwrap().decision, Decision::Idle);
        assert_eq!(sup.previous_running("web"), Some(true));

        sup.runtime().kill("web");
        let report = sup.tick();
        let entry = report.entry("web").unwrap();
        assert!(!entry.running);
        assert_eq!(entry.decision, Decision::Recover);
        assert!(entry.error.is_none());
        assert_eq!(sup.runtime().runs(), vec!["web", "web"]);
        assert_eq!(sup.previous_running("web"), Some(false));

        let calm = sup.tick();
        assert_eq!(calm.entry("web").unwrap().decision, Decision::Idle);
        assert_eq!(sup.runtime().runs().len(), 2);
    }

    #[test]
    fn tick_removes_exited_instance_before_recovering() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();
        sup.runtime().crash("web");

        let report = sup.tick();
        let entry = report.entry("web").unwrap();
        assert!(!entry.running);
        assert_eq!(entry.decision, Decision::Recover);
        assert!(entry.error.is_none());
        assert_eq!(*sup.runtime().removes.borrow(), vec!["web"]);
        assert_eq!(sup.runtime().runs(), vec!["web", "web"]);
        assert!(sup.inspect("web").unwrap().is_running());
    }

    #[test]
    fn stop_of_exited_instance_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();
        sup.runtime().crash("web");

        assert_eq!(sup.stop("web").unwrap(), StopOutcome::NotRunning);
        assert_eq!(*sup.runtime().removes.borrow(), vec!["web"]);
        assert!(sup.runtime().exited.borrow().is_empty());
        assert!(!sup.handles().exists(sup.containers().get("web").unwrap()));
    }

    #[test]
    fn failed_removal_of_exited_instance_skips_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", true, true, None)], FakeRuntime::default(), &dir);
        let _ = sup.start("web").unwrap();
        sup.runtime().crash("web");
        sup.runtime().fail_removes.set(true);

        let report = sup.tick();
        let entry = report.entry("web").unwrap();
        assert_eq!(entry.decision, Decision::Recover);
        assert!(matches!(entry.error, Some(DockwatchError::RuntimeInvocation { .. })));
        assert_eq!(sup.runtime().runs(), vec!["web"]);
    }

    #[test]
    fn tick_ignores_containers_it_never_started() {
        let dir = tempfile::tempdir().unwrap();
        let mut sup = supervisor(&[("web", false, true, None)], FakeRuntime::default(), &dir);
        let report = sup.tick();
        assert_eq!(report.entry("web").unwrap().decision, Decision::Idle);
        assert!(sup.runtime().runs().is_empty());
    }

    #[test]
    fn tick_expires_old_instance_and_restarts_it() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime::default();
        runtime.seed("web", TimeDelta::days(10));
        let mut sup = supervisor(&[("web", true, true, Some("5d"))], runtime, &dir);

        let report = sup.tick();
        assert_eq!(report.entry("web").unwrap().decision, Decision::Expire { restart: true });
        assert_eq!(*sup.runtime().removes.borrow(), vec!["web"]);
        assert_eq!(sup.runtime().runs(), vec!["web"]);
        assert!(sup.handles().exists(sup.containers().get("web").unwrap()));
    }

    #[test]
    fn tick_expiry_without_autorestart_leaves_it_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime::default();
        runtime.seed("web", TimeDelta::days(10));
        let mut sup = supervisor(&[("web", true, false, Some("5d"))], runtime, &dir);

        let _ = sup.tick();
        assert!(sup.runtime().runs().is_empty());
        assert_eq!(sup.inspect("web").unwrap(), ContainerRuntimeState::NotRunning);
        assert!(!sup.handles().exists(sup.containers().get("web").unwrap()));
    }

    #[test]
    fn tick_contains_per_container_failures() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime {
            fail_runs: true,
            ..FakeRuntime::default()
        };
        let mut sup = supervisor(&[("api", true, true, None), ("web", true, true, None)], runtime, &dir);
        for name in ["api", "web"] {
            let spec = sup.containers().get(name).unwrap();
            sup.handles().save(spec, &RuntimeId::new("old")).unwrap();
        }

        let report = sup.tick();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.failures().count(), 2);
        assert!(report.entries.iter().all(|e| e.decision == Decision::Recover));
    }

    #[test]
    fn list_reports_running_instances_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime::default();
        runtime.seed("web", TimeDelta::seconds(120));
        let sup = supervisor(&[("web", true, true, None), ("api", true, true, None)], runtime, &dir);

        let rows = sup.list();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
        assert!(rows[0].instance.is_none());
        assert_eq!(rows[1].instance.as_ref().unwrap().id, RuntimeId::new("seed-web"));
        assert!(rows[1].uptime(Utc::now()).unwrap() >= Duration::from_secs(120));
    }

    #[test]
    fn watch_runs_autostart_then_ticks_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let signal = ShutdownSignal::new();
        let runtime = FakeRuntime {
            stop_after_inspects: Some((4, signal.clone())),
            ..FakeRuntime::default()
        };
        let mut sup = supervisor(&[("web", true, true, None)], runtime, &dir);

        let ticks = sup.watch(&signal);
        assert!(signal.is_raised());
        // inspect #1 is the autostart pass; ticks 1..=3 carry inspects #2..=#4.
        assert_eq!(ticks, 3);
        assert_eq!(sup.runtime().runs(), vec!["web"]);
    }

    #[test]
    fn watch_returns_immediately_when_already_shut_down() {
        let dir = tempfile::tempdir().unwrap();
        let signal = ShutdownSignal::new();
        signal.raise();
        let mut sup = supervisor(&[("web", false, true, None)], FakeRuntime::default(), &dir);
        assert_eq!(sup.watch(&signal), 0);
    }

    #[test]
    fn shutdown_sleep_is_interrupted() {
        let signal = ShutdownSignal::new();
        assert!(signal.sleep(Duration::from_millis(5)));

        let remote = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            remote.raise();
        });
        let started = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(30)));
        assert!(started.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn unbounded_sleep_still_honours_shutdown() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            remote.raise();
        });
        assert!(!signal.sleep(Duration::from_secs(u64::MAX)));
        handle.join().unwrap();
    }
}
