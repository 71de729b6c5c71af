//! Estados de espera de task

use crate::fs::devfs::BlockObject;
use crate::sched::config::PRIORITY_DEFAULT;
use crate::sys::Priority;

/// Motivo pelo qual uma task saiu da espera pela última vez
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnblockType {
    /// Ainda não acordou (ou foi posta para dormir de novo)
    None,
    /// Entrega de sinal sem relação com a transferência
    Signal,
    /// Callback de conclusão de transferência
    Transfer,
}

/// Wait record de uma task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitRecord {
    /// Entrada ocupada por uma task viva
    pub in_use: bool,
    /// Parada por sinal (SIGSTOP/Debugger); não conta como candidata a acordar
    pub stopped: bool,
    /// Prioridade base
    pub priority: Priority,
    /// Canal em que a task está esperando
    pub block_object: Option<BlockObject>,
    /// `false` enquanto dorme
    pub active: bool,
    pub unblock: UnblockType,
}

impl WaitRecord {
    pub const EMPTY: Self = Self {
        in_use: false,
        stopped: false,
        priority: PRIORITY_DEFAULT,
        block_object: None,
        active: false,
        unblock: UnblockType::None,
    };

    /// Record de uma task recém criada (pronta, sem canal)
    pub const fn spawned(priority: Priority) -> Self {
        Self {
            in_use: true,
            stopped: false,
            priority,
            block_object: None,
            active: true,
            unblock: UnblockType::None,
        }
    }

    /// Verifica se a task conta para o cálculo de prioridade ao acordar
    pub const fn is_wake_candidate(&self) -> bool {
        self.in_use && !self.stopped
    }
}
