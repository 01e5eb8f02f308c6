pub mod artifact;
pub mod classifier;
pub mod metrics;
pub mod provisioner;
pub mod split;

pub use artifact::*;
pub use classifier::*;
pub use metrics::*;
pub use provisioner::*;
pub use split::*;
