pub mod case;
pub mod enums;
pub mod update;

pub use case::*;
pub use enums::*;
pub use update::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
