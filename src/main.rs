use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod artifacts;
mod config;
mod error;
mod handler;
mod labels;
mod model;
mod predictor;
mod preprocess;

use config::Config;
use handler::AppState;
use labels::LabelTable;
use model::TfClassifier;
use predictor::Predictor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    artifacts::ensure_files_exist(&config)
        .await
        .context("model artifacts unavailable")?;

    let labels = LabelTable::load(&config.class_list_path).context("failed to load labels")?;

    let classifier = TfClassifier::load(&config.model_path, &config.input_op, &config.output_op)
        .context("failed to load model")?;
    info!(path = %config.model_path.display(), "loaded model");

    let state = Arc::new(AppState {
        predictor: Predictor::new(Arc::new(classifier), labels),
    });
    info!(
        classes = state.predictor.labels().len(),
        "predictor ready"
    );
    let app = handler::router(state, config.body_limit_bytes);

    let addr = SocketAddr::new(config.host, config.port);
    info!("listening on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
