//! # Agora DI
//!
//! Typed service registry for the Agora SDK.
//!
//! Every singleton service a session needs is addressed by an
//! [`InjectedIdentifier`] bound to the capability (usually a trait object
//! type) the service must satisfy. An [`Injector`] holds one slot per
//! identifier: either a deferred factory or an already-built instance.
//! Bootstrap code registers everything, seals the injector, and hands it by
//! reference to the subsystems that resolve their collaborators at first
//! use.
//!
//! ## Features
//!
//! - **Type-safe**: a resolved service always matches the capability its
//!   identifier declares; mismatched keys fail loudly instead of leaking
//!   unchecked casts into call sites
//! - **Lazy**: factories run once, on first resolution, and may resolve
//!   their own dependencies through the injector they receive
//! - **Swappable**: re-registering an identifier substitutes a mock through
//!   the exact path production registration uses
//! - **Concurrent**: one caller constructs, concurrent callers for the same
//!   identifier wait and share the cached instance
//!
//! ## Example
//!
//! ```rust
//! use agora_di::{InjectedIdentifier, Injector};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! static GREETER: InjectedIdentifier<dyn Greeter> = InjectedIdentifier::new("greeter");
//!
//! let injector = Injector::new();
//! injector.register(&GREETER, |_| Ok(Arc::new(English) as Arc<dyn Greeter>))?;
//! injector.seal();
//!
//! let greeter = injector.resolve(&GREETER)?;
//! assert_eq!(greeter.greet(), "hello");
//! # Ok::<(), agora_di::InjectError>(())
//! ```

mod error;
mod identifier;
mod injectable;
mod injector;

pub use error::{InjectError, InjectResult};
pub use identifier::InjectedIdentifier;
pub use injectable::InjectableObject;
pub use injector::{DuplicatePolicy, Injector};
