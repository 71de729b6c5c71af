//! Visão da task consumida pela camada de I/O.
//!
//! A camada de I/O não conhece PCB, stack nem contexto de CPU. Ela só lê e
//! altera o wait record de cada task: em qual canal está esperando e por que
//! acordou pela última vez.

pub mod state;

pub use state::{UnblockType, WaitRecord};
