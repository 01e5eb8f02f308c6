pub mod export;
pub mod features;
pub mod loader;
pub mod summary;

pub use export::*;
pub use loader::*;
pub use summary::*;
