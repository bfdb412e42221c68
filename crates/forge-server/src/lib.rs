//! # forge-server
//!
//! HTTP facade for the Forge pipeline. Exposes generation as a
//! newline-delimited JSON event stream, plus project history, a file
//! explorer for generated projects, and an OS file-manager shortcut.
//! The frontend is embedded in the binary and served at the root.

mod assets;
mod files;
mod history;
mod server;

pub use files::{list_project_files, ProjectFile};
pub use history::{list_history, HistoryEntry};
pub use server::serve;

use forge_core::ForgeConfig;
use tracing::info;

/// Run the HTTP server with the given configuration
pub async fn run(config: ForgeConfig) -> anyhow::Result<()> {
    let addr = format!("127.0.0.1:{}", config.server.port);
    let url = format!("http://{}", addr);

    info!("Starting forge server on {}", addr);

    if config.server.open_browser {
        let url_clone = url.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url_clone) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    println!("Forge running at {}", url);
    println!("Press Ctrl+C to stop");

    server::serve(config, &addr).await
}
