//! Input validation at the service boundary

pub mod input_validator;

pub use input_validator::{InputFields, InputValidator};
