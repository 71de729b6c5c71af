//! # Transfer Request & Completion Callback
//!
//! Estado de controle de uma rodada do coordenador e o callback que o driver
//! dispara (via `AsyncOp::complete`) quando a transferência física termina.
//!
//! ## Máquina de estados
//!
//! ```text
//! Pending ──(resultado síncrono / erro)──────────────────────► Done
//! Pending ──(check_complete: suspende)──► Armed ──(callback)──► Done
//! ```
//!
//! Não existe transição para fora de `Done`. Cancelamento não é estado: chega
//! como `nbyte < 0` no descritor.
//!
//! ## 🔍 Análise Crítica
//!
//! ### ✅ Pontos Fortes
//! - **Broadcast wake:** O callback acorda todas as tasks esperando no mesmo
//!   `(device, direction)`, não só a dona do descritor.
//! - **Sem sentinela mágico:** O resultado da chamada ao driver é um
//!   tri-estado explícito (`CallOutcome`).
//!
//! ### ⚠️ Pontos de Atenção
//! - **Varredura linear:** O callback percorre a tabela de tasks inteira
//!   (O(MAX_TASKS)) dentro da IRQ.

use core::sync::atomic::{AtomicU8, Ordering};

use spin::Mutex;

use super::async_op::{AsyncOp, CompletionHandler};
use super::block::BlockObject;
use super::operations::{IoStatus, McuEvent};
use crate::sched::UnblockType;
use crate::sys::{Errno, Priority, Tid};
use crate::syscall::Privileged;

/// Estado de uma rodada de transferência
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Criada; nada decidido ainda
    Pending = 0,
    /// Task suspensa esperando o callback
    Armed = 1,
    /// Resultado final disponível
    Done = 2,
}

impl RequestStatus {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Armed,
            _ => Self::Done,
        }
    }
}

/// Resultado da chamada `read`/`write` ao driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// O driver nunca foi chamado (dispositivo sem driver)
    NotRun,
    /// O driver aceitou a transferência
    Started(IoStatus),
    /// O driver recusou a transferência antes de começar
    Failed(Errno),
}

pub struct TransferRequest {
    channel: BlockObject,
    status: AtomicU8,
    outcome: Mutex<CallOutcome>,
}

impl TransferRequest {
    pub fn new(channel: BlockObject) -> Self {
        Self {
            channel,
            status: AtomicU8::new(RequestStatus::Pending as u8),
            outcome: Mutex::new(CallOutcome::NotRun),
        }
    }

    pub fn channel(&self) -> BlockObject {
        self.channel
    }

    pub fn status(&self) -> RequestStatus {
        RequestStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn is_done(&self) -> bool {
        self.status() == RequestStatus::Done
    }

    pub fn outcome(&self) -> CallOutcome {
        *self.outcome.lock()
    }

    pub fn set_outcome(&self, outcome: CallOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Pending/Armed → Armed. Falha (retorna `false`) se já estiver Done.
    fn arm(&self) -> bool {
        self.status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                (s != RequestStatus::Done as u8).then_some(RequestStatus::Armed as u8)
            })
            .is_ok()
    }

    fn mark_done(&self) {
        self.status.store(RequestStatus::Done as u8, Ordering::Release);
    }

    /// Decide, logo depois da chamada ao driver e dentro da mesma entrada
    /// privilegiada, se a task atual precisa dormir.
    ///
    /// Suspende quando o driver aceitou a transferência (`Pending`) e o
    /// descritor ainda está em voo (`nbyte > 0`) ou vazio com bloqueio
    /// permitido. Qualquer outro resultado é final. Não faz nada se a
    /// rodada já estiver `Done`.
    pub fn check_complete(&self, cx: &Privileged<'_>, op: &AsyncOp) {
        if self.is_done() {
            return;
        }

        if let CallOutcome::Started(IoStatus::Pending) = self.outcome() {
            let nbyte = op.nbyte();
            if nbyte > 0 || (nbyte == 0 && !op.is_nonblocking()) {
                if self.arm() {
                    let scheduler = cx.scheduler();
                    scheduler.set_wait_channel(cx, op.tid(), Some(self.channel));
                    kdebug!("(DevIO) Suspendendo task=", op.tid().as_u32());
                    scheduler.suspend_current(cx);
                }
                return;
            }
        }

        self.mark_done();
    }
}

impl CompletionHandler for TransferRequest {
    fn on_complete(&self, cx: &Privileged<'_>, op: &AsyncOp, event: &McuEvent) {
        let scheduler = cx.scheduler();
        let count = scheduler.task_count();
        let owner = op.tid();
        let mut wake: Option<Priority> = None;

        if owner.index() < count && scheduler.is_in_use(owner) && event.is_canceled() {
            op.set_error(Errno::ECANCELED);
        }
        if owner.index() < count && scheduler.is_wake_candidate(owner) {
            wake = Some(scheduler.task_priority(owner));
        }

        // Task 0 é o kernel e nunca espera em canal de dispositivo
        for index in 1..count {
            let tid = Tid::new(index as u32);
            if !scheduler.is_in_use(tid) || scheduler.wait_channel(tid) != Some(self.channel) {
                continue;
            }

            scheduler.set_wait_channel(cx, tid, None);
            scheduler.mark_wake_reason(cx, tid, UnblockType::Transfer);
            if scheduler.is_wake_candidate(tid) {
                let priority = scheduler.task_priority(tid);
                wake = Some(wake.map_or(priority, |p| p.max(priority)));
            }
        }

        self.mark_done();
        scheduler.resume_with_priority(cx, wake);
    }
}
