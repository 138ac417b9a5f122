use std::sync::Arc;

use anyhow::Context;
use storage::{
    Database,
    repository::{DatathonStore, InMemoryStore},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod features;
mod middleware;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use config::Config;
use features::{admin, applications, ratings, students, webhooks};
use middleware::auth::{AdminEmails, USER_ID_HEADER};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        students::handlers::get_me,
        students::handlers::set_role,
        students::handlers::change_role,
        applications::handlers::get_status,
        applications::handlers::get_mine,
        applications::handlers::withdraw,
        applications::handlers::submit,
        applications::handlers::update_step,
        ratings::handlers::rate_application,
        ratings::handlers::get_rating,
        ratings::handlers::get_latest_ratings,
        admin::handlers::get_stats,
        admin::handlers::list_applications,
        admin::handlers::update_status,
        webhooks::handlers::clerk_webhook,
    ),
    components(
        schemas(
            storage::dto::common::SuccessResponse,
            storage::dto::student::SetRoleRequest,
            storage::dto::student::StudentProfile,
            storage::dto::application::HasApplicationResponse,
            storage::dto::application::UpdateStatusRequest,
            storage::dto::rating::RateRequest,
            storage::dto::rating::LatestRatingsRequest,
            storage::dto::rating::RatingResponse,
            storage::dto::rating::RatingsResponse,
            storage::dto::admin::RoleCounts,
            storage::dto::admin::ApplicationStats,
            storage::dto::admin::GroupedApplications,
            storage::services::form_steps::FormValue,
            storage::models::Student,
            storage::models::Team,
            storage::models::Role,
            storage::models::Application,
            storage::models::ApplicationDetails,
            storage::models::ApplicationKind,
            storage::models::ApplicationStatus,
            storage::models::ParticipantFields,
            storage::models::MentorFields,
            storage::models::JudgeFields,
            storage::models::Rating,
            webhooks::services::ClerkEvent,
        )
    ),
    tags(
        (name = "students", description = "Caller profile and role selection"),
        (name = "applications", description = "Caller's application form"),
        (name = "ratings", description = "Admin ratings"),
        (name = "admin", description = "Admin review endpoints"),
        (name = "webhooks", description = "Identity provider events"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(USER_ID_HEADER),
                    ),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Datathon applications API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let store: Arc<dyn DatathonStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(database_url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping all data in memory");
            Arc::new(InMemoryStore::new())
        }
    };

    let admins = AdminEmails::from_comma_separated(&config.admin_emails);
    if admins.is_empty() {
        tracing::warn!("ADMIN_EMAILS is empty, admin endpoints will refuse every caller");
    } else {
        tracing::info!("Loaded {} admin email(s)", admins.len());
    }

    if config.webhook_secret.is_none() {
        tracing::warn!("CLERK_WEBHOOK_SECRET not set, provisioning webhook is disabled");
    }

    let state = AppState::new(store, admins, config.webhook_secret.clone());

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let app = routes::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/students/me",
            "/api/students/me/role",
            "/api/students/me/role/change",
            "/api/applications/me",
            "/api/applications/me/status",
            "/api/applications/me/submit",
            "/api/applications/{id}/steps/{step}",
            "/api/admin/ratings/{application_id}",
            "/api/admin/ratings/latest",
            "/api/admin/stats",
            "/api/admin/applications/{application_type}",
            "/api/admin/applications/{id}/status",
            "/api/webhooks/clerk",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("user_id"));
        assert!(components.schemas.contains_key("ClerkEvent"));
    }

    #[test]
    fn test_webhook_route_documents_its_payload() {
        let doc = ApiDoc::openapi();
        let webhook = doc
            .paths
            .paths
            .get("/api/webhooks/clerk")
            .and_then(|item| item.post.as_ref())
            .expect("webhook operation");

        assert!(webhook.request_body.is_some());
    }
}
