//! # Drivers de Infraestrutura
//!
//! Drivers que a própria camada de I/O usa para diagnóstico. Os drivers de
//! dispositivo propriamente ditos (zero, null, fifo) vivem em
//! `fs::devfs::devices` e implementam o contrato `DeviceDriver`.
//!
//! | Driver   | Arquivo      | Uso                                 |
//! |----------|--------------|-------------------------------------|
//! | Serial   | `serial.rs`  | Sink dos macros de log do kernel    |

pub mod serial;
