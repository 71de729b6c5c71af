//! Tabela de wait records
//!
//! Array fixo de `MAX_TASKS` entradas. O índice é o `Tid`. A entrada 0 é a
//! task do kernel, criada junto com a tabela.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use super::config::{MAX_TASKS, PRIORITY_MAX};
use super::task::{UnblockType, WaitRecord};
use crate::fs::devfs::BlockObject;
use crate::sys::{DevResult, Errno, Priority, Tid};

pub struct TaskTable {
    records: Mutex<[WaitRecord; MAX_TASKS]>,
    /// Maior índice já usado + 1
    count: AtomicUsize,
}

impl TaskTable {
    pub fn new() -> Self {
        let mut records = [WaitRecord::EMPTY; MAX_TASKS];
        records[0] = WaitRecord::spawned(PRIORITY_MAX);
        Self {
            records: Mutex::new(records),
            count: AtomicUsize::new(1),
        }
    }

    /// Ocupa a primeira entrada livre (nunca a 0).
    pub fn spawn(&self, priority: Priority) -> DevResult<Tid> {
        let mut records = self.records.lock();
        let slot = records
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, r)| !r.in_use)
            .map(|(i, _)| i);

        let Some(index) = slot else {
            kwarn!("(Sched) Tabela de tasks cheia");
            return Err(Errno::EAGAIN);
        };

        records[index] = WaitRecord::spawned(priority);
        self.count.fetch_max(index + 1, Ordering::Relaxed);
        Ok(Tid::new(index as u32))
    }

    /// Libera a entrada. A task 0 não sai.
    pub fn exit(&self, tid: Tid) {
        if tid == Tid::KERNEL {
            return;
        }
        if let Some(record) = self.records.lock().get_mut(tid.index()) {
            *record = WaitRecord::EMPTY;
        }
    }

    /// Limite da varredura do callback
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Cópia do record (entrada vazia para índices fora da tabela)
    pub fn record(&self, tid: Tid) -> WaitRecord {
        self.records
            .lock()
            .get(tid.index())
            .copied()
            .unwrap_or(WaitRecord::EMPTY)
    }

    pub fn is_active(&self, tid: Tid) -> bool {
        let r = self.record(tid);
        r.in_use && r.active
    }

    pub fn set_stopped(&self, tid: Tid, stopped: bool) {
        self.update(tid, |r| r.stopped = stopped);
    }

    pub fn set_priority(&self, tid: Tid, priority: Priority) {
        self.update(tid, |r| r.priority = priority);
    }

    pub fn block_on(&self, tid: Tid, channel: Option<BlockObject>) {
        self.update(tid, |r| r.block_object = channel);
    }

    /// Acorda a task com o motivo dado.
    pub fn assert_active(&self, tid: Tid, reason: UnblockType) {
        self.update(tid, |r| {
            r.active = true;
            r.unblock = reason;
        });
    }

    /// Põe a task para dormir e zera o motivo do último despertar.
    pub fn assert_sleep(&self, tid: Tid) {
        self.update(tid, |r| {
            r.active = false;
            r.unblock = UnblockType::None;
        });
    }

    /// Tasks esperando no canal `channel`
    pub fn waiters(&self, channel: BlockObject) -> Vec<Tid> {
        self.records
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.in_use && r.block_object == Some(channel))
            .map(|(i, _)| Tid::new(i as u32))
            .collect()
    }

    fn update(&self, tid: Tid, f: impl FnOnce(&mut WaitRecord)) {
        let mut records = self.records.lock();
        match records.get_mut(tid.index()) {
            Some(record) if record.in_use => f(record),
            _ => kwarn!("(Sched) Wait record inexistente: tid=", tid.as_u32()),
        }
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}
