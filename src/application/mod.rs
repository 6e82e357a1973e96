pub mod error;
pub mod task_store;

pub use error::*;
pub use task_store::*;
