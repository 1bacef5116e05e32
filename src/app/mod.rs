pub mod bootstrap;
pub mod matrix;

pub use bootstrap::{Bootstrap, Step};
pub use matrix::{CombinationResult, MatrixRunner};
