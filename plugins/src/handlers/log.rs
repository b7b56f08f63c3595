use async_trait::async_trait;
use rowflow_core::{Row, RowHandler};

/// Dry-run sink: logs each row and writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRowHandler;

#[async_trait]
impl RowHandler for LogRowHandler {
    async fn handle(&self, row: &Row) -> anyhow::Result<()> {
        tracing::debug!(row = row.index(), fields = %row.to_json(), "row processed");
        Ok(())
    }
}
