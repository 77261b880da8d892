pub mod config;
pub mod error;
pub mod form;
pub mod middleware;
pub mod routes;

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use axum::{Router, extract::DefaultBodyLimit};
use chrono::Utc;
use db::DBService;
use services::services::{
    auth::AuthService,
    mailer::Mailer,
    site::{RenderError, SiteRenderer},
    uploads::UploadService,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, error};

use crate::config::Config;

const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub uploads: UploadService,
    pub site: SiteRenderer,
    /// Absent when SMTP is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    last_update: Arc<AtomicI64>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: DBService,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Result<Self, RenderError> {
        let auth = AuthService::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.jwt_ttl_hours),
            config.bcrypt_cost,
        );
        let uploads = UploadService::new(&config.upload_dir, config.optimize_uploads);
        let site = SiteRenderer::new(&config.template_path, &config.output_path)?;

        Ok(Self {
            db,
            config: Arc::new(config),
            auth,
            uploads,
            site,
            mailer,
            last_update: Arc::new(AtomicI64::new(Utc::now().timestamp_millis())),
        })
    }

    /// Unix millis of the last content mutation (or of startup).
    pub fn last_update(&self) -> i64 {
        self.last_update.load(Ordering::SeqCst)
    }

    /// Record a successful mutation and rebuild the public page.
    ///
    /// Rendering problems are logged only; the mutation itself already succeeded.
    pub async fn content_changed(&self, change: &str) {
        let now = Utc::now().timestamp_millis();
        let _ = self
            .last_update
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev + 1))
            });

        match self.site.regenerate(&self.db).await {
            Ok(report) => debug!(change, regions = report.replaced.len(), "Site page refreshed"),
            Err(e) => error!(change, error = %e, "Failed to regenerate site page"),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::last_update::router())
        .merge(routes::auth::router())
        .merge(routes::contact::router())
        .merge(routes::projects::router())
        .merge(routes::testimonials::router())
        .merge(routes::portfolio_projects::router())
        .merge(routes::clients::router())
        .merge(routes::categories::router())
        .merge(routes::blogs::router())
        .merge(routes::personal_info::router())
        .merge(routes::social_links::router())
        .merge(routes::education::router())
        .merge(routes::experience::router())
        .merge(routes::skills::router());

    let static_files = ServeDir::new(&state.config.public_dir);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
