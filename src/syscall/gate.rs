//! # Privilege Gate
//!
//! Executa uma closure em contexto confiável, de forma síncrona, e devolve o
//! controle ao contexto original com todos os efeitos colaterais visíveis.
//!
//! ## Modelo
//!
//! ```text
//! task ──► gate.run(|cx| ...) ──► critical_section::with ──► closure(cx)
//!                                        │
//!                      (IRQ de conclusão recebe o mesmo cx)
//! ```
//!
//! - A entrada é uma `critical_section::with`: a plataforma decide se isso é
//!   mascarar IRQs (single-core), um spinlock global (SMP) ou um mutex (host).
//! - É re-entrante. Um callback de conclusão que já roda dentro do gate pode
//!   chamar `run` de novo sem deadlock.
//! - O token `Privileged` carrega o scheduler. É a prova, no tipo, de que o
//!   código está dentro do gate.
//!
//! ## Suspensão dentro do gate
//!
//! `Scheduler::suspend_current` é chamado com o token na mão, e a entrada só
//! retorna para a task quando ela for acordada e escalonada de novo. Quem
//! implementa o scheduler é responsável por liberar a CPU (troca de contexto)
//! durante a espera.

use core::sync::atomic::{AtomicU64, Ordering};

use critical_section::CriticalSection;

use crate::sched::Scheduler;

/// Gate para o contexto privilegiado.
pub struct PrivilegeGate<'k> {
    scheduler: &'k dyn Scheduler,
    /// Número de entradas (estatística)
    entries: AtomicU64,
}

/// Token de contexto privilegiado.
///
/// Só existe dentro de `PrivilegeGate::run` (ou foi repassado por quem está
/// lá dentro, como um driver chamando o callback de conclusão).
#[derive(Clone, Copy)]
pub struct Privileged<'a> {
    /// Prova de que a seção crítica está aberta durante `'a`
    _cs: CriticalSection<'a>,
    scheduler: &'a dyn Scheduler,
}

impl<'k> PrivilegeGate<'k> {
    /// Cria o gate para o scheduler do kernel.
    pub const fn new(scheduler: &'k dyn Scheduler) -> Self {
        Self {
            scheduler,
            entries: AtomicU64::new(0),
        }
    }

    /// Executa `f` em contexto privilegiado e retorna o resultado.
    pub fn run<R>(&self, f: impl FnOnce(&Privileged<'_>) -> R) -> R {
        self.entries.fetch_add(1, Ordering::Relaxed);
        critical_section::with(|cs| {
            let cx = Privileged {
                _cs: cs,
                scheduler: self.scheduler,
            };
            f(&cx)
        })
    }

    /// Scheduler visto do lado da task (apenas leitura de wait records).
    pub fn scheduler(&self) -> &'k dyn Scheduler {
        self.scheduler
    }

    /// Quantas vezes o gate foi atravessado desde o boot.
    pub fn entries(&self) -> u64 {
        self.entries.load(Ordering::Relaxed)
    }
}

impl<'a> Privileged<'a> {
    /// Scheduler com acesso às primitivas privilegiadas.
    pub fn scheduler(&self) -> &'a dyn Scheduler {
        self.scheduler
    }
}

impl core::fmt::Debug for Privileged<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Privileged").finish_non_exhaustive()
    }
}
