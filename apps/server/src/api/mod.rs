//! API endpoint modules.

pub mod documents;
pub mod health;
pub mod openapi;
pub mod platform;

pub use documents::UploadLimit;
pub use documents::configure_routes as configure_document_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use platform::configure_routes as configure_platform_routes;
