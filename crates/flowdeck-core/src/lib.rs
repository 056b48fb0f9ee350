pub mod backoff;
pub mod ids;
pub mod model;
pub mod resolver;
pub mod stale;
pub mod types;

pub use backoff::*;
pub use ids::*;
pub use model::*;
pub use resolver::*;
pub use stale::*;
pub use types::*;
