//! Router predeploy calls executed against the in-memory AMM.

mod handler;
mod types;

pub use handler::DexHandler;
pub use types::{DexError, DexResult};
