use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use genrematch_core::persist::{save_catalog, save_meta, CatalogPaths, MetaFile, SNAPSHOT_VERSION};
use genrematch_core::{Catalog, Entry};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_snapshot(dir: &std::path::Path, entries: Vec<Entry>) {
    let paths = CatalogPaths::new(dir);
    let catalog = Catalog::new(entries).unwrap();
    save_catalog(&paths, &catalog).unwrap();
    let meta = MetaFile { num_entries: catalog.len() as u32, created_at: "2024-01-01T00:00:00Z".into(), version: SNAPSHOT_VERSION };
    save_meta(&paths, &meta).unwrap();
}

fn tiny_catalog() -> Vec<Entry> {
    vec![
        Entry::new("tt1", "Heat", ["Action", "Crime", "Drama"], 8.3),
        Entry::new("tt2", "The Dark Knight", ["Action", "Crime", "Drama"], 9.0),
        Entry::new("tt3", "Casino", ["Crime", "Drama"], 8.2),
        Entry::new("tt4", "Airplane!", ["Comedy"], 7.7),
    ]
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn recommend_returns_ranked_results() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog());
    let app = server::build_app(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (status, json) = get(app, "/recommend?title=heat&n=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "recommended");
    assert_eq!(json["resolved"]["id"], "tt1");
    let ids: Vec<&str> = json["results"].as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["tt2", "tt3"]);
}

#[tokio::test]
async fn recommend_applies_filters() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog());
    let app = server::build_app(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (_, json) = get(app.clone(), "/recommend?title=Heat&genre=action&min_rating=8.5").await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "The Dark Knight");
    assert_eq!(results[0]["highlight"], "<em>Action</em>,Crime,Drama");

    let (_, json) = get(app, "/recommend?title=Heat&genre=western").await;
    assert_eq!(json["status"], "recommended");
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unresolved_titles_suggest_or_report_not_found() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog());
    let app = server::build_app(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (_, json) = get(app.clone(), "/recommend?title=casinoo").await;
    assert_eq!(json["status"], "did_you_mean");
    assert_eq!(json["suggestions"][0]["title"], "Casino");
    assert_eq!(json["suggestions"][0]["id"], "tt3");

    let (_, json) = get(app, "/recommend?title=zzzqqq").await;
    assert_eq!(json["status"], "not_found");
    assert!(json["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_titles_are_suggested_per_entry_and_ranked_by_id() {
    let dir = tempdir().unwrap();
    let mut entries = tiny_catalog();
    entries.push(Entry::new("tt5", "Casino", ["Comedy"], 5.1));
    write_snapshot(dir.path(), entries);
    let app = server::build_app(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (_, json) = get(app.clone(), "/recommend?title=casinoo").await;
    let ids: Vec<&str> = json["suggestions"].as_array().unwrap().iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["tt3", "tt5"]);

    let (status, json) = get(app.clone(), "/recommend?id=tt5&n=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["resolved"]["id"], "tt5");
    assert_eq!(json["results"][0]["title"], "Airplane!");

    let (status, _) = get(app.clone(), "/recommend?id=tt99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(app, "/recommend?n=3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn entry_and_genres_lookups() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog());
    let app = server::build_app(dir.path().to_string_lossy().to_string(), None).unwrap();

    let (_, json) = get(app.clone(), "/entry/tt3").await;
    assert_eq!(json["title"], "Casino");
    let (_, json) = get(app.clone(), "/entry/tt99").await;
    assert_eq!(json["error"], "not found");
    let (_, json) = get(app, "/genres").await;
    assert_eq!(json, serde_json::json!(["Action", "Comedy", "Crime", "Drama"]));
}

#[tokio::test]
async fn reload_swaps_in_a_new_catalog() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path(), tiny_catalog());
    let app = server::build_app(dir.path().to_string_lossy().to_string(), Some("secret".into())).unwrap();

    let mut bigger = tiny_catalog();
    bigger.push(Entry::new("tt5", "Unforgiven", ["Western"], 8.2));
    write_snapshot(dir.path(), bigger);

    let denied = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "wrong").body(Body::empty()).unwrap();
    let (status, _) = send(app.clone(), denied).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let allowed = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = send(app.clone(), allowed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entries"], 5);

    let (_, json) = get(app, "/genres").await;
    assert!(json.as_array().unwrap().iter().any(|g| g == "Western"));
}
