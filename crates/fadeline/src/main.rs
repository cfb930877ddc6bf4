//! Fadeline server binary.
//!
//! Configuration comes from the environment:
//! - `FADELINE_ADDR` — bind address (default `127.0.0.1:8080`)
//! - `FADELINE_LOG_DIR` — directory for chat/history logs (off when unset)
//! - `RUST_LOG` — tracing filter (default `info`)

use std::path::PathBuf;

use fadeline::{ServerBuilder, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("FADELINE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let mut builder = ServerBuilder::new().bind(&addr);
    if let Some(dir) = std::env::var_os("FADELINE_LOG_DIR") {
        builder = builder.log_dir(PathBuf::from(dir));
    }

    let server = builder.build().await?;
    tracing::info!(addr = %server.local_addr()?, "fadeline listening");
    server.run().await
}
