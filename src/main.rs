use clap::Parser;
use env_logger::Env;

use moodsearch::Opts;
use moodsearch::cli::SubCommandExtend;
use moodsearch::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Reconcile(config) => config.run(&opts).await,
        SubCommand::Embed(config) => config.run(&opts).await,
        SubCommand::AssignXy(config) => config.run(&opts).await,
        SubCommand::Sync(config) => config.run(&opts).await,
        SubCommand::Search(config) => config.run(&opts).await,
        SubCommand::Show(config) => config.run(&opts).await,
        SubCommand::Server(config) => config.run(&opts).await,
    }
}
