pub mod copy;
pub mod error;
pub mod validation;
