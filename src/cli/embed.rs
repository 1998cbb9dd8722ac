use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{OpenAiOptions, Opts};
use crate::sync::backfill_embeddings;
use crate::utils::progress_bar;

#[derive(Parser, Debug, Clone)]
pub struct EmbedCommand {
    #[command(flatten)]
    pub openai: OpenAiOptions,
}

impl SubCommandExtend for EmbedCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let client = self.openai.client()?;
        let db = opts.conf_dir.open_db().await?;
        backfill_embeddings(&db, &*client, &progress_bar()).await?;
        Ok(())
    }
}
