// In-memory reporting client
// Records every call in order; used for dry-run replays and tests

use super::{
    Attachment, ClientError, Completion, ItemFinish, ItemStart, LaunchFinish, LaunchStart,
    LogRecord, ReportingClient, Started, TempId,
};
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// One call made against the client, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RecordedCall {
    StartLaunch {
        temp_id: TempId,
        launch: LaunchStart,
    },
    StartTestItem {
        temp_id: TempId,
        item: ItemStart,
        launch_id: TempId,
        parent_id: Option<TempId>,
    },
    FinishTestItem {
        item_id: TempId,
        finish: ItemFinish,
    },
    FinishLaunch {
        launch_id: TempId,
        finish: LaunchFinish,
    },
    SendLog {
        item_id: TempId,
        record: LogRecord,
        attachment: Option<Attachment>,
    },
}

impl RecordedCall {
    pub fn describe(&self) -> String {
        match self {
            Self::StartLaunch { temp_id, launch } => {
                format!("start-launch {} name={:?}", temp_id, launch.name)
            }
            Self::StartTestItem {
                temp_id,
                item,
                parent_id,
                ..
            } => format!(
                "start-item {} {:?} {:?} parent={}",
                temp_id,
                item.item_type,
                item.name,
                parent_id.as_ref().map_or("-", |p| p.as_str())
            ),
            Self::FinishTestItem { item_id, finish } => format!(
                "finish-item {} status={}",
                item_id,
                finish.status.as_ref().map_or("-", |s| s.as_str())
            ),
            Self::FinishLaunch { launch_id, .. } => format!("finish-launch {}", launch_id),
            Self::SendLog { item_id, record, .. } => {
                format!("send-log {} level={:?}", item_id, record.level)
            }
        }
    }
}

#[derive(Default)]
struct Failures {
    reject_launch: bool,
    reject_start_of: HashSet<String>,
    fail_completion_of: HashSet<String>,
    reject_logs: bool,
    reject_finish_launch: bool,
}

/// Reporting client that keeps calls in memory instead of sending them.
pub struct RecordingClient {
    calls: Mutex<Vec<RecordedCall>>,
    known_items: Mutex<HashSet<TempId>>,
    next_id: AtomicU64,
    failures: Failures,
    gate: Option<watch::Receiver<bool>>,
}

/// Holds start-item completions open until released.
pub struct CompletionGate {
    sender: watch::Sender<bool>,
}

impl CompletionGate {
    pub fn release(&self) {
        let _ = self.sender.send(true);
    }
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            known_items: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1),
            failures: Failures::default(),
            gate: None,
        }
    }

    /// Reject `start_launch` synchronously.
    pub fn reject_launch(mut self) -> Self {
        self.failures.reject_launch = true;
        self
    }

    /// Reject `start_test_item` synchronously for items with this name.
    pub fn reject_start_of(mut self, name: impl Into<String>) -> Self {
        self.failures.reject_start_of.insert(name.into());
        self
    }

    /// Issue an id for items with this name but fail their completion.
    pub fn fail_completion_of(mut self, name: impl Into<String>) -> Self {
        self.failures.fail_completion_of.insert(name.into());
        self
    }

    pub fn reject_logs(mut self) -> Self {
        self.failures.reject_logs = true;
        self
    }

    pub fn reject_finish_launch(mut self) -> Self {
        self.failures.reject_finish_launch = true;
        self
    }

    /// Keep every start-item completion pending until the returned gate is
    /// released.
    pub fn gated(mut self) -> (Self, CompletionGate) {
        let (sender, receiver) = watch::channel(false);
        self.gate = Some(receiver);
        (self, CompletionGate { sender })
    }

    /// Snapshot of all calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: RecordedCall) {
        self.lock_calls().push(call);
    }

    fn issue_id(&self, prefix: &str) -> TempId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        TempId::new(format!("{}-{}", prefix, n))
    }

    fn is_known(&self, id: &TempId) -> bool {
        self.known_items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    fn remember(&self, id: &TempId) {
        self.known_items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone());
    }
}

fn ready(result: Result<(), ClientError>) -> Completion {
    futures::future::ready(result).boxed()
}

impl ReportingClient for RecordingClient {
    fn start_launch(&self, launch: LaunchStart) -> Result<Started, ClientError> {
        if self.failures.reject_launch {
            return Err(ClientError::Rejected {
                operation: "start-launch",
                reason: "launch rejected".to_string(),
            });
        }
        let temp_id = self.issue_id("launch");
        self.remember(&temp_id);
        self.record(RecordedCall::StartLaunch {
            temp_id: temp_id.clone(),
            launch,
        });
        Ok(Started::new(temp_id, ready(Ok(()))))
    }

    fn start_test_item(
        &self,
        item: ItemStart,
        launch_id: &TempId,
        parent_id: Option<&TempId>,
    ) -> Result<Started, ClientError> {
        if self.failures.reject_start_of.contains(&item.name) {
            return Err(ClientError::Rejected {
                operation: "start-item",
                reason: format!("item {:?} rejected", item.name),
            });
        }
        if let Some(parent) = parent_id
            && !self.is_known(parent)
        {
            return Err(ClientError::UnknownItem(parent.to_string()));
        }

        let temp_id = self.issue_id("item");
        self.remember(&temp_id);
        let fails = self.failures.fail_completion_of.contains(&item.name);
        let name = item.name.clone();
        self.record(RecordedCall::StartTestItem {
            temp_id: temp_id.clone(),
            item,
            launch_id: launch_id.clone(),
            parent_id: parent_id.cloned(),
        });

        let gate = self.gate.clone();
        let completion = async move {
            if let Some(mut gate) = gate {
                let _ = gate.wait_for(|open| *open).await;
            }
            if fails {
                return Err(ClientError::Transport(format!(
                    "connection reset while starting {:?}",
                    name
                )));
            }
            Ok(())
        }
        .boxed();

        Ok(Started::new(temp_id, completion))
    }

    fn finish_test_item(&self, item_id: &TempId, finish: ItemFinish) -> Completion {
        self.record(RecordedCall::FinishTestItem {
            item_id: item_id.clone(),
            finish,
        });
        if !self.is_known(item_id) {
            return ready(Err(ClientError::UnknownItem(item_id.to_string())));
        }
        ready(Ok(()))
    }

    fn finish_launch(&self, launch_id: &TempId, finish: LaunchFinish) -> Completion {
        self.record(RecordedCall::FinishLaunch {
            launch_id: launch_id.clone(),
            finish,
        });
        if self.failures.reject_finish_launch {
            return ready(Err(ClientError::Rejected {
                operation: "finish-launch",
                reason: "launch already finished".to_string(),
            }));
        }
        ready(Ok(()))
    }

    fn send_log(
        &self,
        item_id: &TempId,
        record: LogRecord,
        attachment: Option<Attachment>,
    ) -> Completion {
        self.record(RecordedCall::SendLog {
            item_id: item_id.clone(),
            record,
            attachment,
        });
        if self.failures.reject_logs {
            return ready(Err(ClientError::Rejected {
                operation: "send-log",
                reason: "log storage unavailable".to_string(),
            }));
        }
        ready(Ok(()))
    }
}
