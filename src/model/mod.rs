//! CP-SAT model construction for both scheduling phases.

pub mod lab;
pub mod lecture;
pub mod reify;
pub mod varkey;
