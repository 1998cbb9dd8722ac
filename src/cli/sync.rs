use anyhow::Result;
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{OpenAiOptions, Opts, StorageOptions};
use crate::llm::MoodLabeler;
use crate::sync::{backfill_coordinates, backfill_embeddings, reconcile};
use crate::utils::progress_bar;

#[derive(Parser, Debug, Clone)]
pub struct SyncCommand {
    #[command(flatten)]
    pub storage: StorageOptions,
    #[command(flatten)]
    pub openai: OpenAiOptions,
}

impl SubCommandExtend for SyncCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let source = self.storage.open()?;
        let client = self.openai.client()?;
        let db = opts.conf_dir.open_db().await?;

        info!("[1/3] 同步存储桶并标注情绪");
        let labeler: &dyn MoodLabeler = &*client;
        let reconciled =
            reconcile(&db, &*source, Some(labeler), self.storage.page_size, &progress_bar()).await?;
        info!("[2/3] 生成嵌入向量");
        let embedded = backfill_embeddings(&db, &*client, &progress_bar()).await?;
        info!("[3/3] 分配坐标");
        let assigned = backfill_coordinates(&db, &*client, &progress_bar()).await?;

        info!("同步: {}", reconciled);
        info!("嵌入: {}", embedded);
        info!("坐标: {}", assigned);
        Ok(())
    }
}
