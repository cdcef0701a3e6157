//! Development server with live reload
//!
//! Pages are rendered per request from an in-memory snapshot of the site, so
//! free-text search works here even though static output cannot evaluate it.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::Post;
use crate::controller::{LinkStyle, PageController};
use crate::filter::{self, FilterCriteria};
use crate::generator::is_private;
use crate::templates::{TemplateRenderer, STYLESHEET};
use crate::{Blog, CONFIG_FILE};

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Loaded site: configuration and posts, swapped as a unit on reload
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub blog: Blog,
    pub posts: Vec<Post>,
}

impl Snapshot {
    pub fn load(blog: Blog) -> Result<Self> {
        let posts = blog.load_posts()?;
        Ok(Self { blog, posts })
    }
}

/// Server state
pub struct ServerState {
    snapshot: RwLock<Snapshot>,
    renderer: TemplateRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(snapshot: Snapshot, live_reload: bool) -> Result<Arc<Self>> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Arc::new(Self {
            snapshot: RwLock::new(snapshot),
            renderer: TemplateRenderer::new()?,
            reload_tx,
            live_reload,
        }))
    }

    /// Reload configuration and posts from disk and notify clients
    pub async fn reload(&self) -> Result<()> {
        let base_dir = self.snapshot.read().await.blog.base_dir.clone();
        let fresh = Snapshot::load(Blog::new(&base_dir)?)?;
        let count = fresh.posts.len();

        *self.snapshot.write().await = fresh;
        tracing::info!("Reloaded {} posts", count);

        let _ = self.reload_tx.send(());
        Ok(())
    }

    fn page(&self, html: String) -> Html<String> {
        if self.live_reload {
            Html(inject_live_reload(&html))
        } else {
            Html(html)
        }
    }
}

/// Handler error: logged, then reported as a bare 500
pub struct ServerError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ServerError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

type HandlerResult<T> = std::result::Result<T, ServerError>;

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/posts/:id", get(post_handler))
        .route("/posts/:id/", get(post_handler))
        .route("/about", get(about_handler))
        .route("/about/", get(about_handler))
        .route("/api/posts", get(api_posts_handler))
        .route("/assets/style.css", get(stylesheet_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let snapshot = Snapshot::load(blog.clone())?;
    tracing::info!("Loaded {} posts", snapshot.posts.len());

    let state = ServerState::new(snapshot, watch)?;
    let app = router(Arc::clone(&state));

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let watched = blog.clone();
        let state = Arc::clone(&state);
        let handle = tokio::runtime::Handle::current();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&watched, state, handle) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the source directory and config file, reloading the snapshot
fn watch_and_reload(
    blog: &Blog,
    state: Arc<ServerState>,
    handle: tokio::runtime::Handle,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if blog.source_dir.exists() {
        debouncer
            .watcher()
            .watch(&blog.source_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", blog.source_dir);
    }

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // A failed reload keeps serving the previous snapshot
                if let Err(e) = handle.block_on(state.reload()) {
                    tracing::error!("Reload failed: {:#}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn index_handler(
    State(state): State<Arc<ServerState>>,
    Query(criteria): Query<FilterCriteria>,
) -> HandlerResult<Html<String>> {
    let snapshot = state.snapshot.read().await;
    let config = &snapshot.blog.config;

    let controller = PageController::with_criteria(criteria.normalized());
    let listing = controller.listing(&snapshot.posts, &LinkStyle::query(config));
    let html = state.renderer.render_listing(config, &listing)?;

    Ok(state.page(html))
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> HandlerResult<Response> {
    let snapshot = state.snapshot.read().await;
    let config = &snapshot.blog.config;

    let mut controller = PageController::new();
    controller.select_post(&id);

    match controller.post_view(&snapshot.posts, &LinkStyle::query(config)) {
        Some(view) => {
            let html = state.renderer.render_post(config, &view)?;
            Ok(state.page(html).into_response())
        }
        None => {
            tracing::debug!("No post with id {:?}", id);
            let html = state
                .renderer
                .render_not_found(config, Some("That article does not exist."))?;
            Ok((StatusCode::NOT_FOUND, state.page(html)).into_response())
        }
    }
}

async fn about_handler(State(state): State<Arc<ServerState>>) -> HandlerResult<Html<String>> {
    let snapshot = state.snapshot.read().await;
    let html = state.renderer.render_about(&snapshot.blog.config)?;
    Ok(state.page(html))
}

/// JSON body of `/api/posts`
#[derive(Debug, Serialize)]
struct PostsResponse {
    posts: Vec<Post>,
    categories: Vec<String>,
    tags: Vec<String>,
    count: usize,
}

/// Filtered posts; facets always span the whole collection
async fn api_posts_handler(
    State(state): State<Arc<ServerState>>,
    Query(criteria): Query<FilterCriteria>,
) -> Json<PostsResponse> {
    let snapshot = state.snapshot.read().await;
    let posts = filter::filter_owned(&snapshot.posts, &criteria.normalized());

    Json(PostsResponse {
        count: posts.len(),
        posts,
        categories: filter::distinct_categories(&snapshot.posts),
        tags: filter::distinct_tags(&snapshot.posts),
    })
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve public files (images, etc.) from the source directory
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> HandlerResult<Response> {
    let (source_dir, config) = {
        let snapshot = state.snapshot.read().await;
        (
            snapshot.blog.source_dir.clone(),
            snapshot.blog.config.clone(),
        )
    };

    let relative = request.uri().path().trim_start_matches('/').to_string();
    let requested = source_dir.join(&relative);

    if !relative.is_empty() && !is_private(&source_dir, &requested) && requested.is_file() {
        let mut service = ServeDir::new(&source_dir);
        let response = service.try_call(request).await?;
        if response.status() != StatusCode::NOT_FOUND {
            return Ok(response.into_response());
        }
    }

    let html = state.renderer.render_not_found(&config, None)?;
    Ok((StatusCode::NOT_FOUND, state.page(html)).into_response())
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>hi</body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</body>\n</html>"));

        let bare = inject_live_reload("fragment");
        assert!(bare.starts_with("fragment"));
        assert!(bare.contains("WebSocket"));
    }
}
