//! # Agora services
//!
//! Capability contracts the Agora SDK resolves through its service
//! registry. Each module declares one capability trait, its error type and
//! the static [`InjectedIdentifier`] it is registered under. Concrete
//! backends (the gRPC remote client, the on-device secured store, the OS
//! notification gateway) live with the host application or platform
//! layer; this crate only fixes the seams so that production and mock
//! providers are interchangeable under the same identifiers.
//!
//! [`InjectedIdentifier`]: agora_di::InjectedIdentifier

pub mod client;
pub mod notifications;
pub mod storage;

pub use client::{COMMUNITY_CLIENT, ClientError, ClientResult, CommunityClient};
pub use notifications::{
	AuthorizationStatus, NOTIFICATION_AUTHORIZATION, NotificationAuthorizing, NotificationError,
	NotificationResult,
};
pub use storage::{SECURED_STORE, SecuredStore, StoreError, StoreResult};
