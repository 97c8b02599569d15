// Протокол: wire-формат зашифрованного конверта

pub mod messages;
pub mod validation;
pub mod wire;

pub use messages::{EncryptedMessage, MessagePayload};
