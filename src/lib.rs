// (FASE2) src/lib.rs
//! DevIO - Camada de I/O de Dispositivos.
//!
//! Ponto central de exportação dos módulos da camada de transferência.
//! Permite que uma task faça `read`/`write` bloqueante sobre um driver cuja
//! transferência real termina de forma assíncrona (IRQ ou máquina de estados).
//!
//! Fluxo:
//!
//! ```text
//! task ──► TransferCoordinator ──► PrivilegeGate::run ──► driver.read/write
//!               ▲                                              │
//!               │               (pendente)                     ▼
//!               └──── suspend/wake ◄── callback de conclusão ◄─ IRQ
//! ```
//!
//! Em build de teste o crate linka `std` para rodar no host; no alvo ele é
//! `no_std` + `alloc` e a plataforma fornece a implementação de
//! `critical-section`.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (Arc para descritores compartilhados)
extern crate alloc;

// --- Infraestrutura (Logging, Serial) ---
#[macro_use]
pub mod core;
pub mod drivers;

// --- Definições de Sistema (Erros, Tipos) ---
pub mod sys;

// --- Subsistemas ---
pub mod fs; // DevFS, contrato de driver, coordenador de transferência
pub mod sched; // Primitivas de escalonamento consumidas (wait records)
pub mod syscall; // Gate privilegiado

// Re-exports principais
pub use crate::fs::devfs::{DevFs, TransferCoordinator};
pub use crate::sched::Scheduler;
pub use crate::sys::{DevResult, Errno};
pub use crate::syscall::{PrivilegeGate, Privileged};
