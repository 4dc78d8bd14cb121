use std::path::PathBuf;

use clap::Parser;

use crate::assistant::DEFAULT_TOP_K;

pub const DEFAULT_DATASET_PATH: &str = "cleaned_booking_data.csv";
pub const DEFAULT_INDEX_PATH: &str = "booking_index.json";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Analytics and nearest-neighbour retrieval over a hotel booking dataset",
    long_about = None
)]
pub struct Args {
    /// Booking dataset (CSV with a header row)
    #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
    pub dataset: PathBuf,

    /// Prebuilt vector index file
    #[arg(short, long, default_value = DEFAULT_INDEX_PATH)]
    pub index: PathBuf,

    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Number of rows returned by /ask
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Seed for the placeholder query embedder
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub dataset_path: PathBuf,
    pub index_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub top_k: usize,
    pub seed: Option<u64>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            dataset_path: args.dataset,
            index_path: args.index,
            host: args.host,
            port: args.port,
            top_k: args.top_k.max(1),
            seed: args.seed,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
