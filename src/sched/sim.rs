//! Scheduler simulado para os testes de host.
//!
//! Determinístico e single-threaded. Não existe troca de contexto: quando a
//! task atual é suspensa, o próprio `suspend_current` faz o papel do resto do
//! sistema, avançando ticks até alguém acordá-la. A cada tick:
//!
//! 1. roda os hooks agendados para aquele tick (fazem o papel de IRQs de
//!    dispositivo e recebem o mesmo `Privileged` da task suspensa);
//! 2. entrega os sinais agendados às tasks que estiverem dormindo.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use spin::Mutex;

use super::config::MAX_IDLE_TICKS;
use super::{Scheduler, TaskTable, UnblockType};
use crate::fs::devfs::BlockObject;
use crate::sys::{Priority, Tid};
use crate::syscall::Privileged;

type Hook = Box<dyn FnOnce(&Privileged<'_>) + Send>;

pub(crate) struct SimScheduler {
    table: TaskTable,
    current: AtomicU32,
    tick: AtomicU64,
    hooks: Mutex<Vec<(u64, Hook)>>,
    signals: Mutex<Vec<(u64, Tid)>>,
    wakes: Mutex<Vec<Option<Priority>>>,
    suspends: AtomicUsize,
}

#[allow(dead_code)]
impl SimScheduler {
    pub fn new() -> Self {
        Self {
            table: TaskTable::new(),
            current: AtomicU32::new(Tid::KERNEL.as_u32()),
            tick: AtomicU64::new(0),
            hooks: Mutex::new(Vec::new()),
            signals: Mutex::new(Vec::new()),
            wakes: Mutex::new(Vec::new()),
            suspends: AtomicUsize::new(0),
        }
    }

    pub fn spawn(&self, priority: Priority) -> Tid {
        self.table.spawn(priority).expect("tabela de tasks cheia")
    }

    /// Cria uma task e a coloca para rodar.
    pub fn spawn_current(&self, priority: Priority) -> Tid {
        let tid = self.spawn(priority);
        self.set_current(tid);
        tid
    }

    pub fn set_current(&self, tid: Tid) {
        self.current.store(tid.as_u32(), Ordering::Relaxed);
    }

    pub fn table(&self) -> &TaskTable {
        &self.table
    }

    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }

    /// Quantas vezes `suspend_current` foi chamado
    pub fn suspends(&self) -> usize {
        self.suspends.load(Ordering::Relaxed)
    }

    /// Prioridades entregues a `resume_with_priority`, em ordem
    pub fn wakes(&self) -> Vec<Option<Priority>> {
        self.wakes.lock().clone()
    }

    /// Agenda `hook` para rodar `offset` ticks a partir de agora.
    pub fn at(&self, offset: u64, hook: impl FnOnce(&Privileged<'_>) + Send + 'static) {
        let due = self.tick() + offset;
        self.hooks.lock().push((due, Box::new(hook)));
    }

    /// Agenda a entrega de um sinal para `tid` daqui a `offset` ticks.
    pub fn signal_at(&self, offset: u64, tid: Tid) {
        let due = self.tick() + offset;
        self.signals.lock().push((due, tid));
    }

    fn advance(&self, cx: &Privileged<'_>) {
        let now = self.tick.fetch_add(1, Ordering::Relaxed) + 1;

        let due_hooks: Vec<Hook> = {
            let mut hooks = self.hooks.lock();
            let (due, rest): (Vec<_>, Vec<_>) = core::mem::take(&mut *hooks)
                .into_iter()
                .partition(|(at, _)| *at <= now);
            *hooks = rest;
            due.into_iter().map(|(_, hook)| hook).collect()
        };
        for hook in due_hooks {
            hook(cx);
        }

        let due_signals: Vec<Tid> = {
            let mut signals = self.signals.lock();
            let (due, rest): (Vec<_>, Vec<_>) = core::mem::take(&mut *signals)
                .into_iter()
                .partition(|(at, _)| *at <= now);
            *signals = rest;
            due.into_iter().map(|(_, tid)| tid).collect()
        };
        for tid in due_signals {
            let record = self.table.record(tid);
            if record.in_use && !record.active {
                self.table.assert_active(tid, UnblockType::Signal);
            }
        }
    }
}

impl Scheduler for SimScheduler {
    fn current_task_id(&self) -> Tid {
        Tid::new(self.current.load(Ordering::Relaxed))
    }

    fn task_count(&self) -> usize {
        self.table.count()
    }

    fn is_in_use(&self, tid: Tid) -> bool {
        self.table.record(tid).in_use
    }

    fn is_stopped(&self, tid: Tid) -> bool {
        self.table.record(tid).stopped
    }

    fn task_priority(&self, tid: Tid) -> Priority {
        self.table.record(tid).priority
    }

    fn wait_channel(&self, tid: Tid) -> Option<BlockObject> {
        self.table.record(tid).block_object
    }

    fn last_wake_reason(&self, tid: Tid) -> UnblockType {
        self.table.record(tid).unblock
    }

    fn set_wait_channel(&self, _cx: &Privileged<'_>, tid: Tid, channel: Option<BlockObject>) {
        self.table.block_on(tid, channel);
    }

    fn mark_wake_reason(&self, _cx: &Privileged<'_>, tid: Tid, reason: UnblockType) {
        self.table.assert_active(tid, reason);
    }

    fn suspend_current(&self, cx: &Privileged<'_>) {
        let tid = self.current_task_id();
        self.suspends.fetch_add(1, Ordering::Relaxed);
        self.table.assert_sleep(tid);

        let mut idle = 0;
        while !self.table.is_active(tid) {
            if idle == MAX_IDLE_TICKS {
                panic!("(Sim) task suspensa nunca foi acordada");
            }
            self.advance(cx);
            idle += 1;
        }
    }

    fn resume_with_priority(&self, _cx: &Privileged<'_>, priority: Option<Priority>) {
        self.wakes.lock().push(priority);
    }

    fn is_wake_candidate(&self, tid: Tid) -> bool {
        self.table.record(tid).is_wake_candidate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscall::PrivilegeGate;

    #[test]
    fn hooks_run_on_their_tick_and_wake_the_task() {
        let sim = SimScheduler::new();
        let tid = sim.spawn_current(50);
        let gate = PrivilegeGate::new(&sim);

        sim.at(3, move |cx| {
            cx.scheduler().mark_wake_reason(cx, tid, UnblockType::Transfer)
        });
        gate.run(|cx| cx.scheduler().suspend_current(cx));

        assert_eq!(sim.tick(), 3);
        assert_eq!(sim.suspends(), 1);
        assert_eq!(sim.last_wake_reason(tid), UnblockType::Transfer);
    }

    #[test]
    fn signals_wake_only_sleeping_tasks() {
        let sim = SimScheduler::new();
        let tid = sim.spawn_current(50);
        let gate = PrivilegeGate::new(&sim);

        sim.signal_at(2, tid);
        gate.run(|cx| cx.scheduler().suspend_current(cx));

        assert_eq!(sim.tick(), 2);
        assert_eq!(sim.last_wake_reason(tid), UnblockType::Signal);
    }
}
