use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{OpenAiOptions, Opts, SearchOptions};
use crate::llm::Embedder;
use crate::search::{SearchHit, SearchStrategy, build_search, search_with_metrics};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub search: SearchOptions,
    #[command(flatten)]
    pub openai: OpenAiOptions,
    /// 搜索的情绪，例如 happy、calm
    pub query: String,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let embedder = match self.search.strategy {
            SearchStrategy::Vector => Some(self.openai.client()? as Arc<dyn Embedder>),
            _ => None,
        };
        let db = Arc::new(opts.conf_dir.open_db().await?);
        let search = build_search(self.search.strategy, db, embedder, self.search.count)?;

        let result = search_with_metrics(search.as_ref(), &self.query).await?;
        if result.is_empty() {
            info!("没有找到匹配的图片: {}", self.query);
        }

        print_result(&result, self.output_format)
    }
}

fn print_result(result: &[SearchHit], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for hit in result {
                let distance = hit.distance.map(|d| format!("{:.2}", d)).unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", distance, hit.mood.as_deref().unwrap_or("-"), hit.image_url);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
