use std::time::Instant;

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::record::{BoxError, RecordSink, RequestRecord};

/// Every record this driver writes targets the queued (Celery) backend variant.
const CELERY_BACKEND: bool = true;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read test image: {0}")]
    Image(#[from] std::io::Error),
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to record result: {0}")]
    Record(#[source] BoxError),
}

/// Outcome of a probe run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeReport {
    pub requests_sent: u32,
    pub skipped: bool,
}

/// Runs `config.num_requests` sequential measured uploads, writing one record
/// per completed call through `sink`. The first unrecovered error aborts the
/// run; records written before it stay written.
pub async fn run<S: RecordSink>(
    config: &Config,
    client: &reqwest::Client,
    sink: &mut S,
) -> Result<ProbeReport, ProbeError> {
    if !config.image_path.exists() {
        warn!(image = %config.image_path.display(), "test image not found, skipping run");
        return Ok(ProbeReport {
            requests_sent: 0,
            skipped: true,
        });
    }

    for index in 1..=config.num_requests {
        let record = measure_upload(config, client, index).await?;
        sink.record(&record).await.map_err(ProbeError::Record)?;
    }

    info!(requests = config.num_requests, "all records written");
    Ok(ProbeReport {
        requests_sent: config.num_requests,
        skipped: false,
    })
}

/// One iteration: read the image, upload it, time the exchange.
async fn measure_upload(
    config: &Config,
    client: &reqwest::Client,
    index: u32,
) -> Result<RequestRecord, ProbeError> {
    let image = fs::read(&config.image_path).await?;
    let part = Part::bytes(image)
        .file_name(config.image_path.display().to_string())
        .mime_str("image/jpeg")?;
    let form = Form::new().part("file", part);

    let start = Instant::now();
    let response = client
        .post(&config.api_url)
        .header("X-API-Key", &config.api_key)
        .multipart(form)
        .send()
        .await?;
    let elapsed = round4(start.elapsed().as_secs_f64());

    let status = response.status().as_u16();
    info!(index, status, elapsed_seconds = elapsed, "request complete");

    Ok(RequestRecord {
        // num_requests is capped at i32::MAX when the config is parsed.
        index: index as i32,
        status_code: i32::from(status),
        elapsed_seconds: elapsed,
        celery: CELERY_BACKEND,
    })
}

/// Rounds to 4 decimal places, the precision stored in `request_logs`.
fn round4(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}
