use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use genrematch_core::persist::{load_snapshot, CatalogPaths};
use genrematch_core::{EngineState, Entry, Outcome, RecommendRequest, ResultFilter, DEFAULT_TOP_N};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct RecommendParams {
    /// Free-text title to resolve.
    pub title: Option<String>,
    /// Catalog id to rank directly, e.g. one taken from `suggestions`. Wins over `title`.
    pub id: Option<String>,
    pub genre: Option<String>,
    pub min_rating: Option<f32>,
    #[serde(default = "default_n")]
    pub n: usize,
}
fn default_n() -> usize { DEFAULT_TOP_N }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: String,
    /// "recommended", "did_you_mean" or "not_found"
    pub status: &'static str,
    pub resolved: Option<Hit>,
    pub results: Vec<Hit>,
    pub suggestions: Vec<SuggestionHit>,
    pub took_s: f64,
}

#[derive(Serialize)]
pub struct SuggestionHit {
    pub id: String,
    pub title: String,
    pub ratio: f64,
}

#[derive(Serialize)]
pub struct Hit {
    pub id: String,
    pub title: String,
    pub genres: String,
    pub rating: f32,
    pub score: Option<f32>,
    /// Genre text with the genre filter match wrapped in <em>.
    pub highlight: Option<String>,
}

impl Hit {
    fn from_entry(entry: &Entry, score: Option<f32>, genre_filter: Option<&str>) -> Self {
        let genres = entry.genre_text();
        let highlight = genre_filter.and_then(|g| highlight_term(&genres, g));
        Self { id: entry.id.clone(), title: entry.title.clone(), genres, rating: entry.rating, score, highlight }
    }
}

/// Shared handle to the live engine. Readers clone the inner `Arc`; a reload swaps it whole.
#[derive(Clone)]
pub struct AppState {
    pub catalog_dir: PathBuf,
    pub engine: Arc<RwLock<Arc<EngineState>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn engine(&self) -> Arc<EngineState> { self.engine.read().clone() }
}

fn load_engine(dir: &std::path::Path) -> Result<EngineState> {
    let (catalog, meta) = load_snapshot(&CatalogPaths::new(dir))?;
    tracing::info!(entries = meta.num_entries, created_at = %meta.created_at, "loaded catalog snapshot");
    Ok(EngineState::build(catalog)?)
}

/// Load and fit the catalog under `catalog_dir`. Without `admin_token` the reload endpoint is closed.
pub fn build_app(catalog_dir: String, admin_token: Option<String>) -> Result<Router> {
    // Fit the engine at startup
    let catalog_dir = PathBuf::from(catalog_dir);
    let engine = load_engine(&catalog_dir)?;
    let app_state = AppState { catalog_dir, engine: Arc::new(RwLock::new(Arc::new(engine))), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/genres", get(genres_handler))
        .route("/entry/:id", get(entry_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let engine = state.engine();
    let query = match (&params.id, &params.title) {
        (Some(id), _) => id.clone(),
        (None, Some(title)) => title.trim().to_string(),
        (None, None) => return Err((StatusCode::BAD_REQUEST, "either title or id is required".into())),
    };
    let req = RecommendRequest {
        title: query.clone(),
        n: params.n.clamp(1, 100),
        filter: ResultFilter::new(params.genre.clone(), params.min_rating),
    };
    let outcome = match &params.id {
        Some(id) => {
            let row = engine.catalog().row_of(id).ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown id {id}")))?;
            engine.recommend_row(row, &req)
        }
        None => engine.recommend(&req),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "recommend failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let genre_filter = params.genre.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let mut resp = RecommendResponse {
        query,
        status: "not_found",
        resolved: None,
        results: vec![],
        suggestions: vec![],
        took_s: 0.0,
    };
    match outcome {
        Outcome::Recommended { resolved, results } => {
            resp.status = "recommended";
            resp.resolved = Some(Hit::from_entry(resolved, None, None));
            resp.results = results.iter().map(|r| Hit::from_entry(r.entry, Some(r.score), genre_filter)).collect();
        }
        Outcome::DidYouMean(suggestions) => {
            resp.status = "did_you_mean";
            let catalog = engine.catalog().entries();
            resp.suggestions = suggestions
                .into_iter()
                .map(|s| SuggestionHit { id: catalog[s.row].id.clone(), title: s.title, ratio: s.ratio })
                .collect();
        }
        Outcome::NotFound => {}
    }
    resp.took_s = start.elapsed().as_secs_f64();
    Ok(Json(resp))
}

pub async fn genres_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.engine().genres().to_vec())
}

pub async fn entry_handler(State(state): State<AppState>, Path(id): Path<String>) -> Json<serde_json::Value> {
    let engine = state.engine();
    if let Some(entry) = engine.catalog().by_id(&id) {
        return Json(serde_json::json!({
            "id": entry.id,
            "title": entry.title,
            "genres": entry.genre_text(),
            "rating": entry.rating,
        }));
    }
    Json(serde_json::json!({ "error": "not found" }))
}

fn highlight_term(text: &str, term: &str) -> Option<String> {
    let pat = regex::RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build().ok()?;
    if !pat.is_match(text) {
        return None;
    }
    Some(pat.replace_all(text, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string())
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let dir = state.catalog_dir.clone();
    let fresh = tokio::task::spawn_blocking(move || load_engine(&dir))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::warn!(error = %e, "reload failed; keeping current catalog");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;
    let entries = fresh.catalog().len();
    *state.engine.write() = Arc::new(fresh);
    tracing::info!(entries, "catalog reloaded");
    Ok(Json(serde_json::json!({ "entries": entries })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
