//! Core Module
//!
//! Infraestrutura comum da camada de I/O. Hoje contém apenas o sistema de
//! logging zero-overhead usado por todos os subsistemas.

#[macro_use]
pub mod logging;
