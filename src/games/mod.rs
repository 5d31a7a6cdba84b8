pub mod id;
pub mod registry;
pub mod settlement;
pub mod types;

pub use registry::GameRegistry;
pub use settlement::{settle, SettlementRecord};
pub use types::*;
