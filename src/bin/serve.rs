use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use schemabox::diagram::escape_xml;
use schemabox::source::Source;
use schemabox::{Catalog, Divider, Error, ResolveOptions, Theme};
use serde::Deserialize;

/// Serve SVG diagrams generated from registered JSON Schema documents
#[derive(Parser, Debug)]
#[command(name = "schemabox-serve")]
#[command(version)]
#[command(about = "Serve SVG diagrams generated from JSON Schema documents", long_about = None)]
struct Args {
    /// Port accepting HTTP connections
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Character separating selector segments
    #[arg(long, default_value_t = '.')]
    divider: char,

    /// Built-in theme name or path to a TOML/YAML theme file
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    theme: Arc<Theme>,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    url: String,
    collection: String,
    #[serde(default = "default_schema_path")]
    schema_path: String,
}

fn default_schema_path() -> String {
    "components.schemas".to_string()
}

type HttpError = (StatusCode, String);

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    schemabox::logging::init(args.verbose);

    let theme = match args.theme {
        Some(ref spec) => Theme::load(spec).map_err(|e| e.to_string())?,
        None => Theme::default(),
    };
    let state = AppState {
        catalog: Arc::new(Catalog::new(ResolveOptions {
            divider: Divider::new(args.divider),
            ..ResolveOptions::default()
        })),
        theme: Arc::new(theme),
    };

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/collections", post(register_collection))
        .route("/:collection", get(list_objects))
        .route("/:collection/:object", get(render_object))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn register_collection(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<StatusCode, HttpError> {
    if request.collection.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "collection name is required".to_string()));
    }
    let source = Source::parse(&request.url);
    if !source.is_remote() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unsupported url '{}': use http:// or https://", request.url),
        ));
    }

    let bytes = tokio::task::spawn_blocking(move || source.read())
        .await
        .map_err(internal)?
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    store_collection(Arc::clone(&state.catalog), request, bytes).await
}

/// Parses fetched bytes and registers them; anything that does not resolve
/// is reported as an unsupported document.
async fn store_collection(
    catalog: Arc<Catalog>,
    request: RegisterRequest,
    bytes: Vec<u8>,
) -> Result<StatusCode, HttpError> {
    tokio::task::spawn_blocking(move || {
        catalog.register_source(&request.collection, &bytes, &request.schema_path)
    })
    .await
    .map_err(internal)?
    .map_err(|e| (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string()))?;

    Ok(StatusCode::CREATED)
}

async fn list_objects(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Html<String>, HttpError> {
    let objects = state
        .catalog
        .list_objects(&collection)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "collection not found".to_string()))?;
    Ok(Html(object_links(&collection, &objects)))
}

async fn render_object(
    State(state): State<AppState>,
    Path((collection, object)): Path<(String, String)>,
) -> Response {
    let mut svg = Vec::new();
    match state.catalog.render(&collection, &object, &state.theme, &mut svg) {
        Ok(()) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => {
            tracing::warn!(%collection, %object, error = %e, "render failed");
            let status = match e {
                Error::ReferenceNotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string()).into_response()
        }
    }
}

fn object_links(collection: &str, objects: &[String]) -> String {
    objects
        .iter()
        .map(|object| {
            let link = escape_xml(&format!("/{}/{}", collection, object));
            format!(r#"<a href="{link}">{link}</a><br/>"#)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn internal(e: tokio::task::JoinError) -> HttpError {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
