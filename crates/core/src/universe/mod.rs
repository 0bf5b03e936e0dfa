mod registry;
mod types;

pub use registry::{UniverseError, UniverseRegistry};
pub use types::{Company, TickerSymbol};
