pub mod domain;
pub use domain::*;

pub mod catalog;
