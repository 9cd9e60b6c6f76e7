use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use typed_builder::TypedBuilder;

use crate::handlers::{
    create_url_handler, delete_url_handler, get_url_handler, get_url_stats_handler,
    health_handler, list_all_urls_handler, list_urls_handler, list_users_handler, login_handler,
    me_handler, not_found_handler, redirect_handler, register_handler, update_url_handler,
};
use crate::rate_limit::{self, FixedWindowLimiter, RateLimitConfig};
use crate::state::AppState;

/// Limits for the `/api` surface and for redirects, counted separately.
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct RateLimits {
    #[builder(default)]
    pub api: RateLimitConfig,
    #[builder(default)]
    pub redirect: RateLimitConfig,
}

pub struct App {}

impl App {
    pub fn router(state: AppState, limits: RateLimits) -> Router {
        let api_limiter = FixedWindowLimiter::new("api", limits.api);
        let redirect_limiter = FixedWindowLimiter::new("redirect", limits.redirect);

        let api = Router::new()
            .route("/health", get(health_handler))
            .route("/auth/register", post(register_handler))
            .route("/auth/login", post(login_handler))
            .route("/auth/me", get(me_handler))
            .route("/urls", post(create_url_handler).get(list_urls_handler))
            .route(
                "/urls/{id}",
                get(get_url_handler)
                    .patch(update_url_handler)
                    .delete(delete_url_handler),
            )
            .route("/urls/{id}/stats", get(get_url_stats_handler))
            .route("/admin/users", get(list_users_handler))
            .route("/admin/urls", get(list_all_urls_handler))
            .fallback(not_found_handler)
            .layer(middleware::from_fn_with_state(
                api_limiter,
                rate_limit::limit,
            ));

        Router::new()
            .nest("/api", api)
            .route(
                "/{short_id}",
                get(redirect_handler).layer(middleware::from_fn_with_state(
                    redirect_limiter,
                    rate_limit::limit,
                )),
            )
            .fallback(not_found_handler)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}
