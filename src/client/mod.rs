// Reporting client seam
// The remote service's client API as consumed by the reporter

pub mod recording;
pub mod types;

pub use recording::{RecordedCall, RecordingClient};
pub use types::{
    Attachment, ItemAttribute, ItemFinish, ItemStart, ItemStatus, ItemType, LaunchFinish,
    LaunchStart, LogLevel, LogRecord, TempId,
};

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors raised by a reporting client, either synchronously from a start
/// call or through a completion future.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unknown item {0}")]
    UnknownItem(String),
}

/// Awaitable signal for a remote operation. Carries no payload beyond
/// success or failure.
pub type Completion = BoxFuture<'static, Result<(), ClientError>>;

/// Result of a start call: the provisional id is usable immediately, the
/// completion resolves once the remote side has accepted the item.
pub struct Started {
    pub temp_id: TempId,
    pub completion: Completion,
}

impl Started {
    pub fn new(temp_id: TempId, completion: Completion) -> Self {
        Self {
            temp_id,
            completion,
        }
    }
}

impl std::fmt::Debug for Started {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Started")
            .field("temp_id", &self.temp_id)
            .finish_non_exhaustive()
    }
}

/// Client API of the reporting service.
pub trait ReportingClient: Send + Sync {
    fn start_launch(&self, launch: LaunchStart) -> Result<Started, ClientError>;

    fn start_test_item(
        &self,
        item: ItemStart,
        launch_id: &TempId,
        parent_id: Option<&TempId>,
    ) -> Result<Started, ClientError>;

    fn finish_test_item(&self, item_id: &TempId, finish: ItemFinish) -> Completion;

    fn finish_launch(&self, launch_id: &TempId, finish: LaunchFinish) -> Completion;

    fn send_log(
        &self,
        item_id: &TempId,
        record: LogRecord,
        attachment: Option<Attachment>,
    ) -> Completion;
}

impl<C: ReportingClient + ?Sized> ReportingClient for std::sync::Arc<C> {
    fn start_launch(&self, launch: LaunchStart) -> Result<Started, ClientError> {
        (**self).start_launch(launch)
    }

    fn start_test_item(
        &self,
        item: ItemStart,
        launch_id: &TempId,
        parent_id: Option<&TempId>,
    ) -> Result<Started, ClientError> {
        (**self).start_test_item(item, launch_id, parent_id)
    }

    fn finish_test_item(&self, item_id: &TempId, finish: ItemFinish) -> Completion {
        (**self).finish_test_item(item_id, finish)
    }

    fn finish_launch(&self, launch_id: &TempId, finish: LaunchFinish) -> Completion {
        (**self).finish_launch(launch_id, finish)
    }

    fn send_log(
        &self,
        item_id: &TempId,
        record: LogRecord,
        attachment: Option<Attachment>,
    ) -> Completion {
        (**self).send_log(item_id, record, attachment)
    }
}
