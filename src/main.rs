use booking_assistant::config::Args;
use booking_assistant::{
    load_index_from_file, start_server, BookingAssistant, DatasetStore, RandomEmbedder,
    ServerConfig, VectorIndex,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_assistant=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from(Args::parse());
    info!("Starting booking assistant: {:?}", config);

    let dataset = DatasetStore::load_from_file(&config.dataset_path)?;
    info!("Loaded {} bookings from {}", dataset.len(), config.dataset_path.display());

    let index = load_index_from_file(&config.index_path)?;
    info!(
        "Loaded {} index with {} vectors of dimension {} from {}",
        index.index_type(),
        index.len(),
        index.dimension(),
        config.index_path.display()
    );

    let embedder = match config.seed {
        Some(seed) => RandomEmbedder::seeded(index.dimension(), seed)?,
        None => RandomEmbedder::new(index.dimension())?,
    };
    warn!("Query embeddings are random placeholders; /ask results do not depend on the question");

    let assistant = BookingAssistant::new(dataset, index, Box::new(embedder), config.top_k)?;

    start_server(assistant, &config.bind_address()).await?;

    Ok(())
}
