use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{Secrets, SHOW_ARCHIVED_HEADER, TOKEN_HEADER};
use crate::config::{AppConfig, StoreBackend};
use crate::database::{self, DatabaseError, MemoryStore, RecordStore, Repository};
use crate::handlers::{self, resource};
use crate::resource::{AuthorFields, PostFields};

/// Everything the router needs; stores are injected so tests can swap them
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn RecordStore<PostFields>>,
    pub authors: Arc<dyn RecordStore<AuthorFields>>,
    pub secrets: Secrets,
}

impl AppState {
    /// Fresh in-memory tables
    pub fn in_memory(secrets: Secrets) -> Self {
        Self {
            posts: Arc::new(MemoryStore::<PostFields>::new()),
            authors: Arc::new(MemoryStore::<AuthorFields>::new()),
            secrets,
        }
    }

    /// Build the configured backend
    pub async fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        let secrets = config.security.secrets();

        match config.database.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::in_memory(secrets))
            }
            StoreBackend::Postgres => {
                let pool = database::connect(&config.database).await?;
                let repository = Repository::new(pool);
                Ok(Self {
                    posts: Arc::new(repository.clone()),
                    authors: Arc::new(repository),
                    secrets,
                })
            }
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health).with_state(state.posts.clone()))
        // Resources
        .merge(resource::routes(
            "/posts",
            resource::ResourceState {
                store: state.posts,
                secrets: state.secrets.clone(),
            },
        ))
        .merge(resource::routes(
            "/authors",
            resource::ResourceState {
                store: state.authors,
                secrets: state.secrets,
            },
        ))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = router.layer(cors_layer(&config.security.cors_origins));

    if config.api.enable_request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| {
            if o.as_str() == "*" {
                tracing::warn!("Wildcard CORS origin is not allowed with credentials; ignoring");
            }
            o.as_str() != "*"
        })
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            HeaderName::from_static(TOKEN_HEADER),
            HeaderName::from_static(SHOW_ARCHIVED_HEADER),
            header::ACCEPT,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::HOST,
            header::ORIGIN,
            header::USER_AGENT,
        ])
}
