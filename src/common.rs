pub mod error;
pub mod lenient;
