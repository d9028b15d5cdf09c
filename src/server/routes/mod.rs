//! Route handler modules
//!
//! - generate_routes: generation orchestration and history listing

pub mod generate_routes;

pub use generate_routes::{generate_handler, list_handler, run_generation};
