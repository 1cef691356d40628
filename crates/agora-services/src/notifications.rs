//! Notification-authorization capability

use agora_di::InjectedIdentifier;
use async_trait::async_trait;

/// Identifier the session's notification gateway is registered under.
pub static NOTIFICATION_AUTHORIZATION: InjectedIdentifier<dyn NotificationAuthorizing> =
	InjectedIdentifier::new("agora.notifications.authorization");

/// Authorization state reported by the OS notification backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
	/// The user has not been asked yet.
	NotDetermined,
	/// The user declined notifications.
	Denied,
	/// The user granted notifications.
	Authorized,
	/// Provisional delivery without an explicit grant.
	Provisional,
}

impl AuthorizationStatus {
	/// Whether notifications may currently be delivered.
	pub fn allows_delivery(self) -> bool {
		matches!(self, Self::Authorized | Self::Provisional)
	}
}

/// Errors from the notification-authorization backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
	/// The platform backend is not reachable in this environment.
	#[error("notification backend unavailable")]
	Unavailable,

	/// The backend reported a failure.
	#[error("notification backend failure: {0}")]
	Backend(String),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

/// The OS notification-authorization seam.
#[async_trait]
pub trait NotificationAuthorizing: Send + Sync {
	/// The current authorization status.
	fn status(&self) -> AuthorizationStatus;

	/// Prompts the user for authorization; resolves to whether delivery is
	/// now allowed.
	async fn request_authorization(&self) -> NotificationResult<bool>;
}
