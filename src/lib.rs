pub mod attachment;
pub mod cli;
pub mod client;
pub mod config;
pub mod events;
pub mod logging;
pub mod replay;
pub mod reporter;
pub mod time;

pub use client::{RecordingClient, ReportingClient};
pub use events::{NodeId, RunnerEvent, SuiteInfo, TestInfo, TestState};
pub use reporter::{LifecycleListener, PortalReporter, ReportError};
