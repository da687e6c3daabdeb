// Engine-side lifecycle events
// Node identities and states as delivered by the test engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned identifier of a suite or test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A grouping node. The engine's synthetic root is a suite with `root = true`
/// and an empty title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl SuiteInfo {
    /// The untitled top of the suite tree.
    pub fn root(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            parent: None,
            root: true,
            description: None,
        }
    }

    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, parent: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent: Some(parent.into()),
            root: false,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Terminal state of a test as the engine names it.
///
/// States other than the three the engine commonly emits are kept verbatim
/// so they can be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestState {
    Passed,
    Failed,
    Pending,
    Other(String),
}

impl TestState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TestState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "pending" => Self::Pending,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for TestState {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TestState> for String {
    fn from(state: TestState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error attached to a failed test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stack: String,
}

/// A leaf test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfo {
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    pub parent: NodeId,
    /// Only meaningful once the test has ended.
    #[serde(default = "default_state")]
    pub state: TestState,
    #[serde(default)]
    pub err: Option<TestError>,
}

fn default_state() -> TestState {
    TestState::Pending
}

impl TestInfo {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, parent: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent: parent.into(),
            state: TestState::Pending,
            err: None,
        }
    }

    pub fn passed(mut self) -> Self {
        self.state = TestState::Passed;
        self
    }

    pub fn failed(mut self, message: impl Into<String>, stack: impl Into<String>) -> Self {
        self.state = TestState::Failed;
        self.err = Some(TestError {
            message: message.into(),
            stack: stack.into(),
        });
        self
    }

    pub fn with_state(mut self, state: impl Into<TestState>) -> Self {
        self.state = state.into();
        self
    }
}

/// One lifecycle event, as read from an event log or sent over a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunnerEvent {
    RunBegin,
    SuiteBegin { suite: SuiteInfo },
    SuiteEnd { suite: SuiteInfo },
    TestBegin { test: TestInfo },
    TestEnd { test: TestInfo },
    RunEnd,
}

impl RunnerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunBegin => "run_begin",
            Self::SuiteBegin { .. } => "suite_begin",
            Self::SuiteEnd { .. } => "suite_end",
            Self::TestBegin { .. } => "test_begin",
            Self::TestEnd { .. } => "test_end",
            Self::RunEnd => "run_end",
        }
    }
}
