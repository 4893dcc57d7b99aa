//! Restart and lifetime policy.
//!
//! Pure decision logic, evaluated once per container per tick. Rules are
//! checked in order and the first match wins:
//!
//! 1. **Expiry**: running, a maximum lifetime is set, and the instance is
//!    older than it. Stop, then start again if `autorestart`.
//! 2. **Crash recovery**: not running, `autorestart`, and a handle marker
//!    says we started it. Start.
//! 3. Otherwise nothing happens.

use chrono::{DateTime, Utc};

use crate::container::{ContainerRuntimeState, ContainerSpec, RunningInstance};

/// Everything the policy looks at for one container in one tick.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// The container's declaration.
    pub spec: &'a ContainerSpec,
    /// Running flag seen on the previous tick; `None` on the first.
    pub previous_running: Option<bool>,
    /// State seen on this tick.
    pub current: &'a ContainerRuntimeState,
    /// Whether the handle marker exists.
    pub handle_exists: bool,
    /// Evaluation time.
    pub now: DateTime<Utc>,
}

impl Observation<'_> {
    /// The edge between the previous and the current tick, if any.
    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        match (self.previous_running, self.current.is_running()) {
            (Some(false), true) => Some(Transition::CameUp),
            (Some(true), false) => Some(Transition::WentDown),
            _ => None,
        }
    }
}

/// A change in the observed running flag between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Was stopped, now running.
    CameUp,
    /// Was running, now stopped.
    WentDown,
}

/// A runtime operation issued by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove the running instance and its handle marker.
    Stop,
    /// Start a new instance.
    Start,
}

/// Outcome of evaluating the policy for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do.
    Idle,
    /// The instance outlived its maximum lifetime.
    Expire {
        /// Start again after stopping.
        restart: bool,
    },
    /// The container we started is gone.
    Recover,
}

impl Decision {
    /// Actions to execute, in order, within the same tick.
    #[must_use]
    pub const fn actions(self) -> &'static [Action] {
        match self {
            Self::Idle => &[],
            Self::Expire { restart: false } => &[Action::Stop],
            Self::Expire { restart: true } => &[Action::Stop, Action::Start],
            Self::Recover => &[Action::Start],
        }
    }
}

/// Evaluates the rules for one observation.
#[must_use]
pub fn decide(obs: &Observation<'_>) -> Decision {
    match obs.current {
        ContainerRuntimeState::Running(instance) if is_expired(obs.spec, instance, obs.now) => {
            Decision::Expire {
                restart: obs.spec.autorestart(),
            }
        }
        ContainerRuntimeState::NotRunning if obs.spec.autorestart() && obs.handle_exists => {
            Decision::Recover
        }
        _ => Decision::Idle,
    }
}

/// Whether `instance` is strictly older than the container's maximum lifetime.
#[must_use]
pub fn is_expired(spec: &ContainerSpec, instance: &RunningInstance, now: DateTime<Utc>) -> bool {
    spec.max_lifetime()
        .is_some_and(|limit| instance.age(now) > limit)
}
