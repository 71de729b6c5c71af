//! Dispositivos embutidos
//!
//! - `null`, `zero`: síncronos, nunca usam o callback
//! - `fifo`: loopback assíncrono (leitor espera até um escritor entregar)

pub mod fifo;
pub mod null;
pub mod zero;

pub use fifo::FifoDevice;
pub use null::NullDevice;
pub use zero::ZeroDevice;
