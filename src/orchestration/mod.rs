//! # Orchestration
//!
//! Supervision of worker processes for the control process.
//!
//! ## Core Components
//!
//! - **HealthMonitor**: Heartbeat tracking, status classification and recovery bookkeeping
//! - **Coordinator**: Round-phase synchronization and score alignment across workers
//! - **ProcessHandle**: Liveness seam over worker processes, with [`ChildProcess`] for OS children
//! - **ControlPlane**: Message channel from workers into the monitor and coordinator
//!
//! Neither the monitor nor the coordinator spawns or kills anything. They
//! report; the supervisor acts.

pub mod control;
pub mod coordinator;
pub mod health;
pub mod process;

pub use control::{ControlChannel, ControlMessage, ControlPlane, SupervisionReport, DEFAULT_CHANNEL_CAPACITY};
pub use coordinator::{median, Coordinator, CoordinatorStats, RoundReport, WorkerState, WorkerStateView};
pub use health::{HealthMonitor, HealthStats, HeartbeatMetrics, WorkerDetails, WorkerHealth};
pub use process::{ChildProcess, ProcessHandle};
