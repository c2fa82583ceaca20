pub mod config;
pub mod probe;
pub mod record;

pub use config::{Config, ConfigError, DbConfig};
pub use probe::{ProbeError, ProbeReport};
pub use record::{BoxError, MemorySink, PgRecorder, RecordSink, RequestRecord};
