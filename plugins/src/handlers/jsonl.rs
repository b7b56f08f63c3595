use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use rowflow_core::{Row, RowHandler};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Appends every row to a JSON Lines file.
///
/// Lines land in completion order, not dataset order.
pub struct JsonlRowWriter {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlRowWriter {
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("open output file {}", path.display()))?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn flush(&self) -> anyhow::Result<()> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl RowHandler for JsonlRowWriter {
    async fn handle(&self, row: &Row) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(row.fields())?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .with_context(|| format!("write row {} to {}", row.index(), self.path.display()))?;
        Ok(())
    }
}
