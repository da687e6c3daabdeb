// Event delivery for engines that produce RunnerEvent values
// rather than calling LifecycleListener directly

use super::LifecycleListener;
use crate::events::RunnerEvent;
use tokio::sync::mpsc;
use tracing::trace;

/// Route one event to the matching listener method.
pub async fn dispatch<L>(listener: &L, event: &RunnerEvent)
where
    L: LifecycleListener + ?Sized,
{
    trace!("dispatch {}", event.name());
    match event {
        RunnerEvent::RunBegin => listener.on_run_begin().await,
        RunnerEvent::SuiteBegin { suite } => listener.on_suite_begin(suite).await,
        RunnerEvent::SuiteEnd { suite } => listener.on_suite_end(suite).await,
        RunnerEvent::TestBegin { test } => listener.on_test_begin(test).await,
        RunnerEvent::TestEnd { test } => listener.on_test_end(test).await,
        RunnerEvent::RunEnd => listener.on_run_end().await,
    }
}

/// Handle events from a channel in arrival order until every sender is
/// dropped. Returns the number of events handled.
pub async fn drive<L>(listener: &L, mut events: mpsc::Receiver<RunnerEvent>) -> usize
where
    L: LifecycleListener + ?Sized,
{
    let mut handled = 0;
    while let Some(event) = events.recv().await {
        dispatch(listener, &event).await;
        handled += 1;
    }
    handled
}
