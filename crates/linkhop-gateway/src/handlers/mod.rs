mod admin;
mod auth;
mod health;
mod redirect;
mod url;

pub use admin::{list_all_urls_handler, list_users_handler};
pub use auth::{login_handler, me_handler, register_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use url::{
    create_url_handler, delete_url_handler, get_url_handler, get_url_stats_handler,
    list_urls_handler, not_found_handler, update_url_handler,
};
