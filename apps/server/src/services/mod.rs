//! Business logic services.

pub mod api_key;
pub mod documents;
pub mod extraction;
pub mod notification;
pub mod platform;
pub mod reconcile;
pub mod statistics;
pub mod storage;

pub use documents::DocumentService;
pub use extraction::{DocumentExtractor, LlmExtractor};
pub use notification::{Notifier, WebhookNotifier};
pub use reconcile::start_reconcile_task;
pub use storage::{ObjectStore, Storage};
