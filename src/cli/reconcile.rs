use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{OpenAiOptions, Opts, StorageOptions};
use crate::llm::MoodLabeler;
use crate::sync::reconcile;
use crate::utils::progress_bar;

#[derive(Parser, Debug, Clone)]
pub struct ReconcileCommand {
    #[command(flatten)]
    pub storage: StorageOptions,
    #[command(flatten)]
    pub openai: OpenAiOptions,
    /// 使用视觉模型为没有情绪标签的图片标注情绪
    #[arg(long)]
    pub label: bool,
}

impl SubCommandExtend for ReconcileCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let source = self.storage.open()?;
        let client = match self.label {
            true => Some(self.openai.client()?),
            false => None,
        };
        let db = opts.conf_dir.open_db().await?;

        let labeler = client.as_deref().map(|client| client as &dyn MoodLabeler);
        reconcile(&db, &*source, labeler, self.storage.page_size, &progress_bar()).await?;
        Ok(())
    }
}
