//! Constantes de configuração do Scheduler (visão da camada de I/O)

use crate::sys::Priority;

/// Prioridade padrão para tasks de usuário
pub const PRIORITY_DEFAULT: Priority = 128;

/// Prioridade máxima (Realtime/Kernel)
pub const PRIORITY_MAX: Priority = 255;

/// Número máximo de entradas na tabela de tasks (inclui a task 0 do kernel)
pub const MAX_TASKS: usize = 16;

/// Ticks que o scheduler simulado avança antes de desistir de uma task
/// que nunca foi acordada.
pub const MAX_IDLE_TICKS: u64 = 1024;
