pub mod bundle;
pub mod config;
pub mod mutator;
pub mod path;
pub mod python;

pub use bundle::{Bundle, BundleError};
pub use mutator::Mutator;
