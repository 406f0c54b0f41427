//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library Catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Libris Team")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::google_login,
        auth::refresh,
        auth::logout,
        auth::logout_all,
        auth::me,
        auth::list_users,
        auth::update_user_role,
        auth::update_user_status,
        auth::list_roles,
        auth::list_permissions,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::checkout_book,
        books::checkin_book,
        books::library_stats,
    ),
    components(
        schemas(
            // Auth
            crate::models::token::GoogleLoginRequest,
            crate::models::token::RefreshRequest,
            crate::models::token::LogoutRequest,
            crate::models::token::LoginResponse,
            crate::models::token::RefreshResponse,
            auth::MeResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::Permission,
            crate::models::user::UserQuery,
            crate::models::user::UpdateRole,
            crate::models::user::UpdateStatus,
            // Books
            crate::models::book::Book,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::CheckoutBook,
            crate::models::book::LibraryStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and user management"),
        (name = "books", description = "Book catalog and circulation")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
