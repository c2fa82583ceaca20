use tokio::task::JoinHandle;
use tokio_postgres::NoTls;
use tracing::error;

use crate::config::DbConfig;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const INSERT_RECORD: &str = "INSERT INTO request_logs (indice, status_code, tempo_segundos, celery) \
     VALUES ($1, $2, $3, $4)";

/// One row of the `request_logs` table.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestRecord {
    pub index: i32,
    pub status_code: i32,
    pub elapsed_seconds: f64,
    pub celery: bool,
}

/// Destination for per-request measurements.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    async fn record(&mut self, record: &RequestRecord) -> Result<(), BoxError>;
}

/// Writes records to the `request_logs` table, one committed insert per call.
pub struct PgRecorder {
    client: tokio_postgres::Client,
    connection: JoinHandle<()>,
}

impl PgRecorder {
    /// Opens a session to the results database. The connection future runs on
    /// a background task until [`PgRecorder::close`] is called.
    pub async fn connect(db: &DbConfig) -> Result<Self, tokio_postgres::Error> {
        let (client, connection) = db.pg_config().connect(NoTls).await?;
        let connection = tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(error = %err, "postgres connection error");
            }
        });
        Ok(Self { client, connection })
    }

    /// Tears the session down. Runs on every exit path, success or failure.
    pub async fn close(self) {
        drop(self.client);
        let _ = self.connection.await;
    }
}

impl RecordSink for PgRecorder {
    async fn record(&mut self, record: &RequestRecord) -> Result<(), BoxError> {
        self.client
            .execute(
                INSERT_RECORD,
                &[
                    &record.index,
                    &record.status_code,
                    &record.elapsed_seconds,
                    &record.celery,
                ],
            )
            .await?;
        Ok(())
    }
}

/// Keeps records in memory instead of a database. Useful for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<RequestRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RequestRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RequestRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    async fn record(&mut self, record: &RequestRecord) -> Result<(), BoxError> {
        self.records.push(record.clone());
        Ok(())
    }
}
