//! Container lifecycle supervision for dockwatch.
//!
//! The [`supervisor::Supervisor`] polls an external container runtime
//! through a [`client::ContainerRuntime`], records which containers it
//! started in [`state::HandleStore`] markers, and lets [`policy`] decide
//! when a container has crashed or outlived its maximum lifetime.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod client;
pub mod container;
pub mod policy;
pub mod process;
pub mod state;
pub mod supervisor;

pub use client::{ContainerRuntime, DockerCli, InspectOutcome};
pub use container::{ContainerRuntimeState, ContainerSet, ContainerSpec, RunningInstance};
pub use state::HandleStore;
pub use supervisor::{ShutdownSignal, Supervisor};
