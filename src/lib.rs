pub mod canvas;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod observer;
pub mod settings;
pub mod utils;

pub use error::{Error, Result};
