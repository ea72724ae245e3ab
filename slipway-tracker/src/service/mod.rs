//! Service layer
//!
//! Services contain the business logic of the tracker: the job lifecycle
//! operations, live-update broadcasting, and completion notification.
//!
//! The collaborator seams (publisher, notifier) are trait-based to enable
//! testing and dependency injection.

pub mod broadcast;
pub mod job;
pub mod notify;

// Re-export traits
pub use broadcast::Publisher;
pub use notify::Notifier;

// Re-export implementations
pub use broadcast::ChannelPublisher;
pub use notify::WebhookNotifier;
