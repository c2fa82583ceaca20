use std::net::SocketAddr;

use axum::{Router, body::Bytes, routing::post};
use tempfile::tempdir;
use uplat_core::{Config, DbConfig, MemorySink, probe};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local stand-in for the upload API.
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let app = Router::new().route("/api/v1/processar-placa", post(|_body: Bytes| async { "ok" }));
        axum::serve(listener, app).await.unwrap();
    });

    let tmp = tempdir()?;
    let image_path = tmp.path().join("imagem_teste.jpg");
    std::fs::write(&image_path, b"\xff\xd8\xff\xe0 demo image bytes")?;

    let config = Config {
        api_url: format!("http://{addr}/api/v1/processar-placa"),
        num_requests: 3,
        image_path,
        api_key: "demo-key".to_string(),
        db: DbConfig {
            dbname: "unused".to_string(),
            user: "unused".to_string(),
            password: "unused".to_string(),
            host: "localhost".to_string(),
            port: 5432,
        },
    };

    let client = reqwest::Client::new();
    let mut sink = MemorySink::new();
    let report = probe::run(&config, &client, &mut sink).await?;

    println!("requests sent: {}", report.requests_sent);
    for record in sink.records() {
        println!(
            "#{} status={} elapsed={:.4}s celery={}",
            record.index, record.status_code, record.elapsed_seconds, record.celery
        );
    }
    Ok(())
}
