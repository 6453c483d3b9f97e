pub mod context;
pub mod shutdown;
pub mod types;
pub mod validations;

pub use context::*;
pub use shutdown::*;
pub use types::*;
pub use validations::*;
