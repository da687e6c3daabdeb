// Reporter adapter
// Translates engine lifecycle events into reporting client calls

pub mod correlation;
pub mod dispatch;

pub use correlation::CorrelationMap;
pub use dispatch::{dispatch, drive};

use crate::attachment;
use crate::client::{
    ClientError, Completion, ItemFinish, ItemStart, ItemStatus, ItemType, LaunchFinish,
    LaunchStart, LogLevel, LogRecord, ReportingClient, TempId,
};
use crate::config::{Config, ReporterOptions};
use crate::events::{NodeId, SuiteInfo, TestInfo, TestState};
use crate::time::{Clock, SystemClock};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Longest item name the reporting service accepts, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// The six lifecycle events a test engine emits. Implementations must not
/// fail or panic: the engine keeps running whatever happens here.
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    async fn on_run_begin(&self);
    async fn on_suite_begin(&self, suite: &SuiteInfo);
    async fn on_suite_end(&self, suite: &SuiteInfo);
    async fn on_test_begin(&self, test: &TestInfo);
    async fn on_test_end(&self, test: &TestInfo);
    async fn on_run_end(&self);
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The node's start was never recorded, so there is no item to act on.
    #[error("no reporting item recorded for node {node}")]
    Uncorrelated { node: NodeId },

    #[error("launch was not started")]
    LaunchNotStarted,

    #[error("failed test {node} carries no error")]
    MissingError { node: NodeId },
}

/// Forwards lifecycle events to a [`ReportingClient`], tracking which remote
/// item belongs to which engine node.
pub struct PortalReporter<C> {
    client: C,
    options: ReporterOptions,
    screenshots_dir: Option<PathBuf>,
    clock: Box<dyn Clock>,
    launch_id: OnceLock<TempId>,
    items: CorrelationMap,
}

impl<C: ReportingClient> PortalReporter<C> {
    pub fn new(client: C, options: ReporterOptions) -> Self {
        Self {
            client,
            options,
            screenshots_dir: None,
            clock: Box::new(SystemClock),
            launch_id: OnceLock::new(),
            items: CorrelationMap::new(),
        }
    }

    pub fn from_config(client: C, config: &Config) -> Self {
        let mut reporter = Self::new(client, config.reporter.clone());
        reporter.screenshots_dir = config.attachments.screenshots_dir.clone();
        reporter
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_screenshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshots_dir = Some(dir.into());
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn launch_id(&self) -> Option<&TempId> {
        self.launch_id.get()
    }

    /// Remote id recorded for an engine node, if its start went through.
    pub fn item_id(&self, node: &NodeId) -> Option<TempId> {
        self.items.get(node)
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    fn require_launch(&self) -> Result<&TempId, ReportError> {
        self.launch_id.get().ok_or(ReportError::LaunchNotStarted)
    }

    fn require_item(&self, node: &NodeId) -> Result<TempId, ReportError> {
        self.items.get(node).ok_or_else(|| {
            warn!("Node {} ended before its start was recorded", node);
            ReportError::Uncorrelated { node: node.clone() }
        })
    }

    /// Parent lookup. An absent parent is not an error: top-level suites
    /// hang off the untitled root, which never gets a remote item.
    fn parent_item(&self, parent: Option<&NodeId>) -> Option<TempId> {
        parent.and_then(|p| self.items.get(p))
    }

    /// Start a remote item and commit its provisional id before handing back
    /// the completion, so children can resolve it while it is still pending.
    fn start_item(
        &self,
        node: &NodeId,
        item: ItemStart,
        parent: Option<TempId>,
    ) -> Result<Completion, ReportError> {
        let launch_id = self.require_launch()?;
        debug!(
            "start-item {:?} {:?} parent={:?}",
            item.item_type, item.name, parent
        );
        let started = self
            .client
            .start_test_item(item, launch_id, parent.as_ref())?;
        self.items.insert(node.clone(), started.temp_id);
        Ok(started.completion)
    }

    async fn launch_start(&self) -> Result<(), ReportError> {
        let launch = LaunchStart {
            token: self.options.token.clone(),
            name: self.options.launch.clone(),
            description: self.options.description.clone(),
            attributes: self.options.attributes.clone(),
            rerun: self.options.rerun,
            rerun_of: self.options.rerun_of.clone(),
            start_time: self.now(),
        };

        let started = self.client.start_launch(launch)?;
        debug!("start-launch {}", started.temp_id);
        if self.launch_id.set(started.temp_id).is_err() {
            warn!("Run began twice; keeping the first launch");
        }
        started.completion.await?;
        Ok(())
    }

    async fn suite_start(&self, suite: &SuiteInfo) -> Result<(), ReportError> {
        if suite.title.is_empty() {
            return Ok(());
        }

        let parent = if suite.root {
            None
        } else {
            self.parent_item(suite.parent.as_ref())
        };
        let item = ItemStart {
            item_type: ItemType::Suite,
            name: truncate_name(&suite.title),
            start_time: self.now(),
            description: suite.description.clone(),
            attributes: Vec::new(),
        };

        self.start_item(&suite.id, item, parent)?.await?;
        Ok(())
    }

    async fn suite_finish(&self, suite: &SuiteInfo) -> Result<(), ReportError> {
        if suite.title.is_empty() {
            return Ok(());
        }

        let item_id = self.require_item(&suite.id)?;
        debug!("finish-item {} (suite)", item_id);
        self.client
            .finish_test_item(&item_id, ItemFinish::default())
            .await?;
        Ok(())
    }

    async fn test_start(&self, test: &TestInfo) -> Result<(), ReportError> {
        if test.title.is_empty() {
            return Ok(());
        }

        let parent = self.parent_item(Some(&test.parent));
        let item = ItemStart {
            item_type: ItemType::Step,
            name: truncate_name(&test.title),
            start_time: self.now(),
            description: None,
            attributes: Vec::new(),
        };

        self.start_item(&test.id, item, parent)?.await?;
        Ok(())
    }

    /// Log-send and finish form one unit: if the log cannot be sent the
    /// item is left unfinished. The mocha reporter fires the log without
    /// awaiting it and always sends the finish.
    async fn test_finish(&self, test: &TestInfo) -> Result<(), ReportError> {
        if test.title.is_empty() {
            return Ok(());
        }

        let status = resolve_status(&test.state);
        if status == ItemStatus::Failed {
            self.send_log(test).await?;
        }

        let item_id = self.require_item(&test.id)?;
        debug!("finish-item {} status={}", item_id, status);
        let finish = ItemFinish {
            end_time: Some(self.now()),
            status: Some(status),
        };
        self.client.finish_test_item(&item_id, finish).await?;
        Ok(())
    }

    /// Attach the failure's stack trace, plus a screenshot attachment named
    /// after the test, to the still-open test item.
    pub async fn send_log(&self, test: &TestInfo) -> Result<(), ReportError> {
        let item_id = self.require_item(&test.id)?;
        let err = test.err.as_ref().ok_or_else(|| ReportError::MissingError {
            node: test.id.clone(),
        })?;
        let message = if err.stack.is_empty() {
            err.message.clone()
        } else {
            err.stack.clone()
        };

        let attachment = attachment::file_object(&test.title, self.screenshots_dir.as_deref());
        let record = LogRecord {
            message,
            level: LogLevel::Error,
            time: self.now(),
        };

        debug!("send-log {}", item_id);
        self.client
            .send_log(&item_id, record, Some(attachment))
            .await?;
        Ok(())
    }

    async fn launch_finish(&self) -> Result<(), ReportError> {
        let launch_id = self.require_launch()?;
        let finish = LaunchFinish {
            end_time: Some(self.now()),
        };
        debug!("finish-launch {}", launch_id);
        self.client.finish_launch(launch_id, finish).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: ReportingClient> LifecycleListener for PortalReporter<C> {
    async fn on_run_begin(&self) {
        if let Err(e) = self.launch_start().await {
            error!("Failed to run launch. Error: {}", e);
        }
    }

    async fn on_suite_begin(&self, suite: &SuiteInfo) {
        if let Err(e) = self.suite_start(suite).await {
            error!("Failed to create suite. Error: {}", e);
        }
    }

    async fn on_suite_end(&self, suite: &SuiteInfo) {
        if let Err(e) = self.suite_finish(suite).await {
            error!("Failed to finish suite. Error: {}", e);
        }
    }

    async fn on_test_begin(&self, test: &TestInfo) {
        if let Err(e) = self.test_start(test).await {
            error!("Failed to create test item. Error: {}", e);
        }
    }

    async fn on_test_end(&self, test: &TestInfo) {
        if let Err(e) = self.test_finish(test).await {
            error!("Failed to finish failed test item. Error: {}", e);
        }
    }

    async fn on_run_end(&self) {
        if let Err(e) = self.launch_finish().await {
            error!("Failed to finish run. Error: {}", e);
        }
    }
}

/// Engine state to reporting status: `pending` is reported as skipped,
/// everything else passes through under its own name.
pub fn resolve_status(state: &TestState) -> ItemStatus {
    match state {
        TestState::Pending => ItemStatus::Skipped,
        TestState::Passed => ItemStatus::Passed,
        TestState::Failed => ItemStatus::Failed,
        TestState::Other(s) => ItemStatus::from(s.clone()),
    }
}

pub fn truncate_name(title: &str) -> String {
    title.chars().take(MAX_NAME_LEN).collect()
}
