//! Static file server for local viewing.
//!
//! Serves a directory (normally the extraction output, with `papers.json`,
//! `stats.json` and any viewer assets) over plain HTTP. Every response
//! carries permissive CORS headers. The server runs until Ctrl+C.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::path::{Path, PathBuf};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

/// Methods advertised in `Access-Control-Allow-Methods`.
const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Headers advertised in `Access-Control-Allow-Headers`.
const ALLOWED_HEADERS: &str = "Content-Type";

/// Options for running the static server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve.
    pub dir: PathBuf,
    /// Open the URL in a browser once listening.
    pub open_browser: bool,
}

impl From<&Config> for ServeOptions {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            dir: config.serve_dir(),
            open_browser: config.server.open_browser,
        }
    }
}

impl ServeOptions {
    /// Address string passed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", bracket_ipv6(&self.host), self.port)
    }

    /// URL printed for the user. Wildcard binds are shown as localhost.
    pub fn url(&self) -> String {
        let host = match self.host.as_str() {
            "" | "0.0.0.0" | "::" => "localhost".to_string(),
            h => bracket_ipv6(h),
        };
        format!("http://{}:{}", host, self.port)
    }
}

fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Build the router: static files from `dir`, CORS headers on every response.
pub fn router(dir: &Path) -> Router {
    // Answers preflight requests; plain responses get their headers below.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
}

/// Start the server and block until Ctrl+C.
///
/// Returns an error if the directory is missing or the address cannot be bound.
pub async fn run_server(options: &ServeOptions) -> Result<()> {
    if !options.dir.is_dir() {
        bail!("Serve directory does not exist: {}", options.dir.display());
    }

    let bind_addr = options.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    let url = options.url();
    info!("Serving {} on {}", options.dir.display(), bind_addr);

    println!("🌐 Review viewer server");
    println!("   Directory: {}", options.dir.display());
    println!("   Serving at {}", url);
    println!("   Press Ctrl+C to stop");

    if options.open_browser {
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, router(&options.dir))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("✅ Server stopped.");
    Ok(())
}

/// Resolves when Ctrl+C is received.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            println!("\n🛑 Shutting down server...");
            info!("Interrupt received, closing listener");
        }
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
