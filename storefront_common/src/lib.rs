mod money;

pub mod op;

pub use money::{Cents, CentsConversionError};
