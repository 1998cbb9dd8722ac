pub mod cli;
pub mod config;
pub mod coords;
pub mod db;
pub mod distance;
pub mod llm;
mod metrics;
pub mod search;
pub mod server;
pub mod storage;
pub mod store;
pub mod sync;
pub mod utils;

pub use config::Opts;
pub use db::MoodDB;
pub use store::RecordStore;
