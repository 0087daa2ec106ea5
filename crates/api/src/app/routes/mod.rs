//! Route tables.
//!
//! Public routes handle login/logout; everything else sits behind the auth
//! middleware (wired in `app::build_app`).

use axum::routing::{delete, get, post};
use axum::Router;

pub mod auth;
pub mod entries;
pub mod profile;
pub mod reports;
pub mod system;

/// Routes reachable without credentials.
pub fn public_router() -> Router {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/auth/google-login", post(auth::google_login))
        .route("/logout", delete(auth::logout))
}

/// Routes that require a resolved identity.
pub fn protected_router() -> Router {
    Router::new()
        .route("/getuser", get(profile::get_user))
        .route("/upload", post(profile::upload_image))
        .route("/income", get(entries::list_incomes).post(entries::create_income))
        .route(
            "/income/:id",
            axum::routing::put(entries::update_income).delete(entries::delete_income),
        )
        .route("/expense", get(entries::list_expenses).post(entries::create_expense))
        .route(
            "/expense/:id",
            axum::routing::put(entries::update_expense).delete(entries::delete_expense),
        )
        .route("/filter/income", get(reports::filter_incomes))
        .route("/filter/expense", get(reports::filter_expenses))
        .route("/summary", get(reports::summary))
        .route("/savings", get(reports::savings))
}
