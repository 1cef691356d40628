//! Secured on-device storage capability

use agora_di::InjectedIdentifier;
use async_trait::async_trait;

/// Identifier the session's secured store is registered under.
pub static SECURED_STORE: InjectedIdentifier<dyn SecuredStore> =
	InjectedIdentifier::new("agora.storage.secured");

/// Errors from the secured storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	/// The backend failed to read or write.
	#[error("storage backend failure: {0}")]
	Backend(String),

	/// The backend refused access, e.g. the device keystore is locked.
	#[error("storage access denied")]
	AccessDenied,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value storage backed by the platform's secured enclave.
///
/// Session tokens and device secrets go through this seam. The production
/// backend wraps the OS keystore; tests substitute an in-memory store
/// under the same [`SECURED_STORE`] identifier.
#[async_trait]
pub trait SecuredStore: Send + Sync {
	/// Reads the value stored under `key`, if any.
	async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

	/// Stores `value` under `key`, replacing any previous value.
	async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

	/// Removes the value stored under `key`. Removing an absent key is not
	/// an error.
	async fn remove(&self, key: &str) -> StoreResult<()>;
}
