//! HTTP handlers for parl-viewer

pub mod buildinfo;
pub mod entity;
pub mod error;
pub mod health;
pub mod pages;
pub mod summary;
pub mod ui;

pub use buildinfo::get_build_info;
pub use entity::get_entity;
pub use error::ApiError;
pub use health::health_routes;
pub use pages::index_page;
pub use summary::get_summary;
pub use ui::serve_app_css;
