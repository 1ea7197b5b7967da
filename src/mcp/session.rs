//! Scoped use of the aggregator for one chat turn.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::aggregate::{AggregatedToolSet, MCPToolAggregator};
use crate::error::SwitchboardError;
use crate::util::timeout::with_timeout;

/// Spawns `close` if a turn is dropped before it finished closing.
struct TurnGuard {
    aggregator: Option<Arc<MCPToolAggregator>>,
    turn_id: Uuid,
}

impl TurnGuard {
    fn disarm(&mut self) {
        self.aggregator = None;
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        let Some(aggregator) = self.aggregator.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(turn_id = %self.turn_id, "turn dropped outside a runtime; MCP connections not closed");
            return;
        };
        tracing::debug!(turn_id = %self.turn_id, "turn aborted, closing MCP connections in background");
        runtime.spawn(async move { aggregator.close().await });
    }
}

impl MCPToolAggregator {
    /// Run one turn with the merged tool set.
    ///
    /// `turn` gets at most `budget` of wall-clock time, tool discovery
    /// included. Connections are closed before this returns, whether the turn
    /// succeeded, failed or ran out of time. On expiry the result is
    /// [`SwitchboardError::Timeout`].
    pub async fn run_turn<F, Fut, T>(
        self: &Arc<Self>,
        budget: Duration,
        turn: F,
    ) -> Result<T, SwitchboardError>
    where
        F: FnOnce(AggregatedToolSet) -> Fut,
        Fut: Future<Output = Result<T, SwitchboardError>>,
    {
        let turn_id = Uuid::new_v4();
        let mut guard = TurnGuard {
            aggregator: Some(Arc::clone(self)),
            turn_id,
        };

        let outcome = with_timeout(budget, async {
            let tools = self.get_tools().await;
            tracing::debug!(%turn_id, tools = tools.len(), "turn started");
            turn(tools).await
        })
        .await;

        if let Err(error) = &outcome {
            tracing::warn!(%turn_id, %error, "turn failed");
        }

        self.close().await;
        guard.disarm();
        outcome
    }
}
