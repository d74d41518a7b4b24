use quietwinks::{AppState, Markdown, auth, chats, db, include_res, index, posts, profiles, smiles, wallet};
use axum::{
    debug_handler, response::IntoResponse, routing::get, Router
};
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let db_url = dotenv::var("DATABASE_URL").unwrap_or("sqlite:quietwinks.db".to_string());
    let db_pool = db::connect(&db_url).await.unwrap();

    let public_url =
        dotenv::var("PUBLIC_URL").unwrap_or("http://localhost:8080".to_string());
    let clients = match dotenv::var("CLIENT_SECRET_PATH")
        .ok()
        .and_then(|path| std::fs::read_to_string(path).ok())
    {
        Some(raw) => auth::Clients::from_json(
            serde_json::from_str(&raw).unwrap(),
            &public_url,
        )
        .unwrap(),
        None => {
            tracing::warn!("no oauth client secrets, only local credential login will work");
            auth::Clients::none()
        }
    };

    let app_state = AppState { db_pool, clients };

    let app = Router::new()
        .route("/", get(index::index))
        .route("/about", get(about))
        .route("/singles", get(profiles::singles))

        .merge(auth::router())
        .nest("/c", chats::router())
        .nest("/f", posts::router())
        .nest("/p", profiles::router())
        .nest("/s", smiles::router())
        .nest("/wallet", wallet::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or("0.0.0.0:8080".to_string());
    tracing::info!(%bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

#[debug_handler]
async fn about() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/about.md"))
}
