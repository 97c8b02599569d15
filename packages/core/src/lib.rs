// Cipherlink Core
// Client-side end-to-end encryption engine

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Модули
pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod utils;

// Re-exports для удобства
pub use api::{spawn_sweeper, E2eeService, E2eeStats, SweeperHandle};
pub use config::Config;
pub use crypto::keys::ExportedPublicKeys;
pub use crypto::peer_keys::KeyPurpose;
pub use protocol::messages::EncryptedMessage;
pub use utils::error::{E2eeError, Result};
pub use utils::logging::init_logging;
