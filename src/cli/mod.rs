mod assign_xy;
mod embed;
mod reconcile;
mod search;
pub mod server;
mod show;
mod sync;

pub use assign_xy::*;
pub use embed::*;
pub use reconcile::*;
pub use search::*;
pub use server::*;
pub use show::*;
pub use sync::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
