//! System Definitions.
//!
//! Constantes e tipos que definem a interface entre a camada de I/O, o
//! scheduler e os drivers.

pub mod error;
pub mod types;

pub use error::{DevResult, Errno};
pub use types::{Location, Priority, Tid};
