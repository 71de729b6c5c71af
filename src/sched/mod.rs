//! # Scheduler Interface (consumida pela camada de I/O)
//!
//! A camada de I/O não escalona nada. Ela consome um conjunto pequeno de
//! primitivas do scheduler do kernel para colocar a task atual para dormir
//! num canal de dispositivo e para acordar as tasks certas quando a
//! transferência termina.
//!
//! ## 🎯 Propósito e Responsabilidade
//! - **Contrato:** O trait `Scheduler` é tudo que o coordenador de
//!   transferência e o callback de conclusão enxergam do scheduler.
//! - **Tabela de espera:** `TaskTable` guarda os wait records e serve de base
//!   para quem implementa o trait na plataforma.
//!
//! ## 🏗️ Arquitetura: leitura livre, escrita privilegiada
//! - Leitura (`current_task_id`, `wait_channel`, `last_wake_reason`, ...) é
//!   permitida em contexto de task.
//! - Toda mutação exige `&Privileged`, ou seja, só acontece dentro do
//!   `PrivilegeGate`. É a disciplina de seção crítica do kernel, aplicada pelo
//!   sistema de tipos em vez de um lock explícito.
//!
//! ## 🔍 Análise Crítica (Kernel Engineer's View)
//!
//! ### ✅ Pontos Fortes
//! - **Injeção:** O scheduler é passado explicitamente para o gate. Nada de
//!   tabela global mutável.
//!
//! ### ⚠️ Pontos de Atenção
//! - **`suspend_current` bloqueia dentro do gate:** A implementação real
//!   precisa trocar de contexto sem sair da seção crítica lógica. Em
//!   single-core isso é natural (a task volta com IRQs mascaradas); em SMP a
//!   implementação de `critical-section` precisa ser liberada na troca.

pub mod config;
pub mod table;
pub mod task;

#[cfg(test)]
pub(crate) mod sim;

pub use table::TaskTable;
pub use task::{UnblockType, WaitRecord};

use crate::fs::devfs::BlockObject;
use crate::sys::{Priority, Tid};
use crate::syscall::Privileged;

/// Primitivas de escalonamento usadas pela camada de I/O.
pub trait Scheduler: Sync {
    /// Task em execução (dona da transferência sendo emitida)
    fn current_task_id(&self) -> Tid;

    /// Limite superior dos índices de task em uso (varredura do callback)
    fn task_count(&self) -> usize;

    fn is_in_use(&self, tid: Tid) -> bool;

    fn is_stopped(&self, tid: Tid) -> bool;

    fn task_priority(&self, tid: Tid) -> Priority;

    /// Canal em que a task está esperando, se algum
    fn wait_channel(&self, tid: Tid) -> Option<BlockObject>;

    /// Motivo da última saída de espera
    fn last_wake_reason(&self, tid: Tid) -> UnblockType;

    /// Registra (ou limpa) o canal de espera de uma task.
    fn set_wait_channel(&self, cx: &Privileged<'_>, tid: Tid, channel: Option<BlockObject>);

    /// Marca a task como ativa e grava o motivo do despertar (assert-active).
    fn mark_wake_reason(&self, cx: &Privileged<'_>, tid: Tid, reason: UnblockType);

    /// Suspende a task atual (update-on-sleep).
    ///
    /// Só retorna quando a task for acordada e escalonada de novo.
    fn suspend_current(&self, cx: &Privileged<'_>);

    /// Entrega ao scheduler a maior prioridade acordada (update-on-wake).
    ///
    /// `None` quando nenhuma task elegível foi acordada.
    fn resume_with_priority(&self, cx: &Privileged<'_>, priority: Option<Priority>);

    /// Task viva e não parada: conta para a prioridade ao acordar.
    fn is_wake_candidate(&self, tid: Tid) -> bool {
        self.is_in_use(tid) && !self.is_stopped(tid)
    }
}
