//! # Async Operation Descriptor
//!
//! Uma requisição de transferência em voo. É compartilhada entre a task que
//! a emitiu (coordenador) e o driver/IRQ que a conclui, então vive em um
//! `Arc` e só é liberada quando os dois lados soltarem a referência.
//!
//! ## `nbyte`
//!
//! Entra com o número de bytes pedido e é reescrito pelo driver:
//!
//! | valor | significado                              |
//! |-------|------------------------------------------|
//! | `> 0` | bytes transferidos                       |
//! | `0`   | sem dados ainda (pendente)               |
//! | `< 0` | `-errno` (erro assíncrono ou cancelamento) |
//!
//! ## Buffer
//!
//! O buffer do chamador não é entregue ao driver. O descritor carrega um
//! buffer próprio (bounce buffer) que o coordenador preenche antes de uma
//! escrita e copia de volta depois de uma leitura. Assim o driver pode
//! segurar o descritor além do tempo de vida do slice do chamador (ex.: task
//! interrompida por sinal) sem invalidar memória.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicIsize, Ordering};

use spin::{Mutex, MutexGuard};

use super::operations::{McuEvent, OpenFlags};
use crate::sys::{Errno, Location, Tid};
use crate::syscall::Privileged;

/// Quem é avisado quando o driver conclui o descritor.
pub trait CompletionHandler: Send + Sync {
    fn on_complete(&self, cx: &Privileged<'_>, op: &AsyncOp, event: &McuEvent);
}

pub struct AsyncOp {
    loc: Location,
    flags: OpenFlags,
    tid: Tid,
    requested: usize,
    nbyte: AtomicIsize,
    buf: Mutex<Box<[u8]>>,
    handler: Option<Arc<dyn CompletionHandler>>,
    fired: AtomicBool,
}

impl AsyncOp {
    pub fn new(
        loc: Location,
        flags: OpenFlags,
        tid: Tid,
        buf: Box<[u8]>,
        handler: Option<Arc<dyn CompletionHandler>>,
    ) -> Self {
        let requested = buf.len();
        Self {
            loc,
            flags,
            tid,
            requested,
            nbyte: AtomicIsize::new(requested as isize),
            buf: Mutex::new(buf),
            handler,
            fired: AtomicBool::new(false),
        }
    }

    /// Endereço (bloco) ou canal (caractere) da transferência
    pub fn location(&self) -> Location {
        self.loc
    }

    pub fn is_nonblocking(&self) -> bool {
        self.flags.is_nonblocking()
    }

    /// Task dona do descritor
    pub fn tid(&self) -> Tid {
        self.tid
    }

    /// Tamanho pedido pelo chamador
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn nbyte(&self) -> isize {
        self.nbyte.load(Ordering::Acquire)
    }

    pub fn set_nbyte(&self, nbyte: isize) {
        self.nbyte.store(nbyte, Ordering::Release);
    }

    /// Grava `-errno` no `nbyte`
    pub fn set_error(&self, errno: Errno) {
        self.set_nbyte(errno.as_isize());
    }

    /// Buffer da transferência
    pub fn buffer(&self) -> MutexGuard<'_, Box<[u8]>> {
        self.buf.lock()
    }

    /// O driver já chamou `complete`?
    pub fn is_complete(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Chamado pelo driver quando a transferência física termina.
    ///
    /// Roda o handler no máximo uma vez. Retorna `false` (e ignora) uma
    /// segunda conclusão do mesmo descritor.
    pub fn complete(&self, cx: &Privileged<'_>, event: &McuEvent) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            kwarn!("(DevIO) Conclusão duplicada ignorada: loc=", self.loc);
            return false;
        }

        ktrace!("(DevIO) Descritor concluído: nbyte=", self.nbyte());
        if let Some(handler) = &self.handler {
            handler.on_complete(cx, self, event);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::devfs::operations::EventFlags;
    use crate::sched::sim::SimScheduler;
    use crate::syscall::PrivilegeGate;
    use alloc::vec;
    use core::sync::atomic::AtomicUsize;

    struct Counter(AtomicUsize);

    impl CompletionHandler for Counter {
        fn on_complete(&self, _cx: &Privileged<'_>, op: &AsyncOp, _event: &McuEvent) {
            assert!(op.is_complete());
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn nbyte_starts_at_the_requested_count() {
        let op = AsyncOp::new(0, OpenFlags::RDONLY, Tid(1), vec![0u8; 16].into_boxed_slice(), None);

        assert_eq!(op.requested(), 16);
        assert_eq!(op.nbyte(), 16);

        op.set_error(Errno::ECANCELED);
        assert_eq!(op.nbyte(), -125);
    }

    #[test]
    fn handler_runs_at_most_once() {
        let sim = SimScheduler::new();
        let gate = PrivilegeGate::new(&sim);
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let handler: Arc<dyn CompletionHandler> = counter.clone();
        let op = AsyncOp::new(3, OpenFlags::RDONLY, Tid(1), vec![0u8; 4].into_boxed_slice(), Some(handler));
        let event = McuEvent::new(EventFlags::DATA_READY, 3);

        let first = gate.run(|cx| op.complete(cx, &event));
        let second = gate.run(|cx| op.complete(cx, &event));

        assert!(first);
        assert!(!second);
        assert_eq!(counter.0.load(Ordering::Relaxed), 1);
    }
}
