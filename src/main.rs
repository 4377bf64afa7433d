//! Churn Risk Service - Main Entry Point
//!
//! Loads the churn artifacts, then answers assessment requests over NATS.

use anyhow::{Context, Result};
use churn_risk_pipeline::{
    config::{AppConfig, LoggingConfig},
    metrics::{AssessmentMetrics, MetricsReporter},
    ArtifactCache, ArtifactLoader, AssessmentResponder, ChurnPredictor, RequestConsumer,
    RequestHandler,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/config.toml".to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    init_logging(&config.logging)?;
    info!(config = %config_path, "Starting Churn Risk Service");

    // Artifacts are loaded before serving anything; a failure here stops the process
    let cache = ArtifactCache::new(ArtifactLoader::new(config.artifacts.clone()));
    let artifacts = cache.get().context("Failed to load churn artifacts")?;
    let predictor = ChurnPredictor::new(artifacts);
    info!(
        features = ?predictor.feature_names(),
        "Churn predictor ready"
    );

    let metrics = Arc::new(AssessmentMetrics::new());
    let handler = RequestHandler::new(predictor, metrics.clone());

    if config.service.metrics_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.service.metrics_interval_secs);
        tokio::spawn(reporter.start());
    }

    let client = async_nats::connect(&config.nats.url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = RequestConsumer::new(
        client.clone(),
        &config.nats.request_subject,
        &config.nats.options_subject,
    );
    let responder = AssessmentResponder::new(client.clone(), &config.nats.result_subject);

    // Options lookups are cheap, answer them inline on their own task
    let mut options_subscription = consumer.subscribe_options().await?;
    let options_handler = handler.clone();
    let options_responder = responder.clone();
    tokio::spawn(async move {
        while let Some(message) = options_subscription.next().await {
            if let Err(e) = options_responder
                .respond_options(message.reply, &options_handler.options())
                .await
            {
                error!(error = %e, "Failed to answer options request");
            }
        }
    });

    let workers = config.service.workers.max(1);
    info!(
        workers,
        requests = %consumer.request_subject(),
        results = %responder.result_subject(),
        "Serving assessment requests"
    );

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut subscription = consumer.subscribe_requests().await?;

    while let Some(message) = subscription.next().await {
        if handler.is_halted() {
            error!("Artifact schema mismatch detected, no longer serving");
            break;
        }

        let permit = semaphore.clone().acquire_owned().await?;

        let handler = handler.clone();
        let responder = responder.clone();

        tokio::spawn(async move {
            let payload = message.payload;
            let response = match tokio::task::spawn_blocking(move || handler.handle(&payload)).await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "Assessment task failed");
                    drop(permit);
                    return;
                }
            };

            if let Err(e) = responder.respond(message.reply, &response).await {
                error!(
                    request_id = %response.request_id,
                    error = %e,
                    "Failed to publish assessment reply"
                );
            }

            drop(permit);
        });
    }

    info!("Service shutting down...");
    metrics.print_summary();

    if handler.is_halted() {
        anyhow::bail!("Stopped serving: churn artifacts disagree with the feature layout");
    }

    Ok(())
}
