// Публичный API движка
// Высокоуровневые операции поверх crypto и protocol

pub mod maintenance;
pub mod service;

pub use maintenance::{spawn_sweeper, SweeperHandle};
pub use service::{E2eeService, E2eeStats};
