//! FIFO - Loopback assíncrono
//!
//! Um buffer circular em memória com no máximo um leitor pendente. É o
//! dispositivo mais simples que exercita o caminho assíncrono inteiro:
//!
//! - Leitura com dados: conclui na hora.
//! - Leitura sem dados, bloqueante: fica pendente (`nbyte = 0`) até um
//!   escritor chegar; o escritor entrega direto no descritor do leitor e
//!   dispara `DATA_READY` a partir do próprio contexto privilegiado.
//! - Leitura sem dados, non-blocking: `nbyte = 0`, não registra leitor.
//! - Segundo leitor simultâneo: `EBUSY`.
//! - `SetAction` com `DATA_READY`: esquece o leitor pendente.
//! - `I_FIFO_FLUSH`: descarta os dados e cancela o leitor pendente.
//! - `I_FIFO_LEN`: bytes no buffer.

use alloc::collections::VecDeque;
use alloc::sync::Arc;

use spin::Mutex;

use crate::fs::devfs::async_op::AsyncOp;
use crate::fs::devfs::device::DeviceHandle;
use crate::fs::devfs::operations::{DeviceDriver, EventFlags, IoStatus, Ioctl, McuEvent};
use crate::sys::{DevResult, Errno};
use crate::syscall::Privileged;

/// Capacidade padrão do buffer
pub const FIFO_CAPACITY: usize = 256;

/// Descarta dados e cancela o leitor pendente
pub const I_FIFO_FLUSH: u32 = 0x4601;
/// Retorna o número de bytes no buffer
pub const I_FIFO_LEN: u32 = 0x4602;

struct FifoState {
    data: VecDeque<u8>,
    capacity: usize,
    reader: Option<Arc<AsyncOp>>,
}

/// Driver do FIFO
pub struct FifoDevice {
    state: Mutex<FifoState>,
}

impl FifoDevice {
    pub fn new() -> Self {
        Self::with_capacity(FIFO_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(FifoState {
                data: VecDeque::with_capacity(capacity),
                capacity,
                reader: None,
            }),
        }
    }

    /// Bytes no buffer
    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_reader(&self) -> bool {
        self.state.lock().reader.is_some()
    }

    /// Entrega `bytes`: primeiro ao leitor pendente, o resto vai para o
    /// buffer. Retorna quantos bytes foram aceitos.
    pub fn feed(&self, cx: &Privileged<'_>, bytes: &[u8]) -> DevResult<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }

        let (accepted, reader) = {
            let mut state = self.state.lock();
            let reader = state.reader.take();

            let mut delivered = 0;
            if let Some(reader) = &reader {
                let mut dst = reader.buffer();
                delivered = dst.len().min(bytes.len());
                dst[..delivered].copy_from_slice(&bytes[..delivered]);
                reader.set_nbyte(delivered as isize);
            }

            let rest = &bytes[delivered..];
            let room = state.capacity - state.data.len();
            if reader.is_none() && room == 0 {
                return Err(Errno::EAGAIN);
            }
            let queued = rest.len().min(room);
            state.data.extend(&rest[..queued]);
            (delivered + queued, reader)
        };

        // Fora do lock: o callback acorda tasks e pode voltar ao driver
        if let Some(reader) = reader {
            reader.complete(cx, &McuEvent::new(EventFlags::DATA_READY, reader.location()));
        }
        Ok(accepted)
    }

    /// Descarta os dados e cancela o leitor pendente.
    pub fn flush(&self, cx: &Privileged<'_>) {
        let reader = {
            let mut state = self.state.lock();
            state.data.clear();
            state.reader.take()
        };

        if let Some(reader) = reader {
            kdebug!("(FIFO) Cancelando leitor pendente: tid=", reader.tid().as_u32());
            reader.complete(cx, &McuEvent::new(EventFlags::CANCELED, reader.location()));
        }
    }
}

impl Default for FifoDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDriver for FifoDevice {
    fn ioctl(&self, cx: &Privileged<'_>, _handle: &DeviceHandle, request: Ioctl<'_>) -> DevResult<usize> {
        match request {
            Ioctl::SetAction(action) => {
                if action.events.contains(EventFlags::DATA_READY) && self.state.lock().reader.take().is_some() {
                    kdebug!("(FIFO) Leitor pendente descartado");
                }
                Ok(0)
            }
            Ioctl::Raw { request: I_FIFO_FLUSH, .. } => {
                self.flush(cx);
                Ok(0)
            }
            Ioctl::Raw { request: I_FIFO_LEN, .. } => Ok(self.len()),
            Ioctl::Raw { .. } => Err(Errno::EINVAL),
        }
    }

    fn read(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        let mut state = self.state.lock();
        if state.reader.is_some() {
            return Err(Errno::EBUSY);
        }

        if !state.data.is_empty() {
            let mut dst = op.buffer();
            let n = dst.len().min(state.data.len());
            for (slot, byte) in dst.iter_mut().zip(state.data.drain(..n)) {
                *slot = byte;
            }
            return Ok(IoStatus::Complete(n));
        }

        op.set_nbyte(0);
        if !op.is_nonblocking() {
            state.reader = Some(op.clone());
        }
        Ok(IoStatus::Pending)
    }

    fn write(&self, cx: &Privileged<'_>, _handle: &DeviceHandle, op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        let data = op.buffer();
        let n = self.feed(cx, &data)?;
        Ok(IoStatus::Complete(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::devfs::device::{Device, DeviceNumber, DeviceType};
    use crate::fs::devfs::operations::OpenFlags;
    use crate::fs::devfs::TransferCoordinator;
    use crate::fs::devfs::BlockObject;
    use crate::sched::sim::SimScheduler;
    use crate::sched::{Scheduler, UnblockType};
    use crate::sys::{Priority, Tid};
    use crate::syscall::PrivilegeGate;
    use alloc::vec;
    use core::sync::atomic::{AtomicBool, Ordering};

    fn fifo_device(fifo: &Arc<FifoDevice>) -> Device {
        Device::new("fifo", DeviceType::Character, DeviceNumber::new(240, 0)).with_driver(fifo.clone())
    }

    #[test]
    fn buffered_data_is_read_synchronously() {
        let sim = SimScheduler::new();
        sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::new());
        let device = fifo_device(&fifo);
        let io = TransferCoordinator::new(&gate);

        assert_eq!(io.write(&device, OpenFlags::WRONLY, 0, b"hello"), Ok(5));
        assert_eq!(fifo.len(), 5);

        let mut buf = [0u8; 3];
        assert_eq!(io.read(&device, OpenFlags::RDONLY, 0, &mut buf), Ok(3));
        assert_eq!(&buf, b"hel");
        assert_eq!(fifo.len(), 2);
        assert_eq!(sim.suspends(), 0);
    }

    #[test]
    fn blocking_reader_waits_for_a_writer() {
        let sim = SimScheduler::new();
        sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::new());
        let device = fifo_device(&fifo);

        let writer = fifo.clone();
        sim.at(2, move |cx| {
            assert_eq!(writer.feed(cx, b"abcdef"), Ok(6));
        });
        let mut buf = [0u8; 4];
        let n = TransferCoordinator::new(&gate).read(&device, OpenFlags::RDONLY, 0, &mut buf);

        assert_eq!(n, Ok(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(fifo.len(), 2);
        assert_eq!(sim.suspends(), 1);
        assert!(!fifo.has_reader());
    }

    #[test]
    fn nonblocking_reader_is_not_registered() {
        let sim = SimScheduler::new();
        sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::new());
        let device = fifo_device(&fifo);
        let mut buf = [0u8; 4];

        let result = TransferCoordinator::new(&gate).read(&device, OpenFlags::NONBLOCK, 0, &mut buf);

        assert_eq!(result, Err(Errno::ENODATA));
        assert!(!fifo.has_reader());
    }

    #[test]
    fn second_reader_is_busy() {
        let sim = SimScheduler::new();
        let tid = sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::new());
        let device = fifo_device(&fifo);

        let first = Arc::new(AsyncOp::new(0, OpenFlags::RDONLY, tid, vec![0u8; 4].into_boxed_slice(), None));
        let status = gate.run(|cx| fifo.read(cx, device.handle(), &first));
        assert_eq!(status, Ok(IoStatus::Pending));

        let mut buf = [0u8; 4];
        let result = TransferCoordinator::new(&gate).read(&device, OpenFlags::RDONLY, 0, &mut buf);
        assert_eq!(result, Err(Errno::EBUSY));
    }

    #[test]
    fn flush_cancels_the_pending_reader() {
        let sim = SimScheduler::new();
        sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::new());
        let device = fifo_device(&fifo);

        let flusher = fifo.clone();
        sim.at(1, move |cx| flusher.flush(cx));
        let mut buf = [0u8; 4];
        let result = TransferCoordinator::new(&gate).read(&device, OpenFlags::RDONLY, 0, &mut buf);

        assert_eq!(result, Err(Errno::ECANCELED));
        assert!(!fifo.has_reader());
    }

    #[test]
    fn full_fifo_rejects_writes() {
        let sim = SimScheduler::new();
        sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::with_capacity(4));
        let device = fifo_device(&fifo);
        let io = TransferCoordinator::new(&gate);

        assert_eq!(io.write(&device, OpenFlags::WRONLY, 0, b"abcdef"), Ok(4));
        assert_eq!(io.write(&device, OpenFlags::WRONLY, 0, b"g"), Err(Errno::EAGAIN));
    }

    #[test]
    fn signal_interrupts_an_empty_read_and_drops_the_reader() {
        let sim = SimScheduler::new();
        let tid = sim.spawn_current(60);
        let gate = PrivilegeGate::new(&sim);
        let fifo = Arc::new(FifoDevice::new());
        let device = fifo_device(&fifo);

        sim.signal_at(2, tid);
        let mut buf = [0u8; 4];
        let result = TransferCoordinator::new(&gate).read(&device, OpenFlags::RDONLY, 0, &mut buf);

        assert_eq!(result, Err(Errno::EINTR));
        assert!(!fifo.has_reader());

        // O próximo escritor não encontra leitor fantasma: os dados ficam no buffer
        assert_eq!(TransferCoordinator::new(&gate).write(&device, OpenFlags::WRONLY, 0, b"xy"), Ok(2));
        assert_eq!(fifo.len(), 2);
    }

    /// Scheduler que entrega dados ao FIFO no instante em que a task
    /// interrompida sai do canal (escritor chegando junto com o sinal).
    struct WriterAtAbandon {
        sim: SimScheduler,
        fifo: Arc<FifoDevice>,
        fed: AtomicBool,
    }

    impl Scheduler for WriterAtAbandon {
        fn current_task_id(&self) -> Tid {
            self.sim.current_task_id()
        }

        fn task_count(&self) -> usize {
            self.sim.task_count()
        }

        fn is_in_use(&self, tid: Tid) -> bool {
            self.sim.is_in_use(tid)
        }

        fn is_stopped(&self, tid: Tid) -> bool {
            self.sim.is_stopped(tid)
        }

        fn task_priority(&self, tid: Tid) -> Priority {
            self.sim.task_priority(tid)
        }

        fn wait_channel(&self, tid: Tid) -> Option<BlockObject> {
            self.sim.wait_channel(tid)
        }

        fn last_wake_reason(&self, tid: Tid) -> UnblockType {
            self.sim.last_wake_reason(tid)
        }

        fn set_wait_channel(&self, cx: &Privileged<'_>, tid: Tid, channel: Option<BlockObject>) {
            self.sim.set_wait_channel(cx, tid, channel);
            let interrupted = channel.is_none() && self.sim.last_wake_reason(tid) == UnblockType::Signal;
            if interrupted && !self.fed.swap(true, Ordering::Relaxed) {
                assert_eq!(self.fifo.feed(cx, b"data"), Ok(4));
            }
        }

        fn mark_wake_reason(&self, cx: &Privileged<'_>, tid: Tid, reason: UnblockType) {
            self.sim.mark_wake_reason(cx, tid, reason);
        }

        fn suspend_current(&self, cx: &Privileged<'_>) {
            self.sim.suspend_current(cx);
        }

        fn resume_with_priority(&self, cx: &Privileged<'_>, priority: Option<Priority>) {
            self.sim.resume_with_priority(cx, priority);
        }
    }

    #[test]
    fn writer_arriving_with_the_signal_is_not_lost() {
        let fifo = Arc::new(FifoDevice::new());
        let sched = WriterAtAbandon {
            sim: SimScheduler::new(),
            fifo: fifo.clone(),
            fed: AtomicBool::new(false),
        };
        let tid = sched.sim.spawn_current(60);
        sched.sim.signal_at(2, tid);
        let gate = PrivilegeGate::new(&sched);
        let device = fifo_device(&fifo);

        let mut buf = [0u8; 4];
        let result = TransferCoordinator::new(&gate).read(&device, OpenFlags::RDONLY, 0, &mut buf);

        assert_eq!(result, Ok(4));
        assert_eq!(&buf, b"data");
        assert!(sched.fed.load(Ordering::Relaxed));
        assert!(fifo.is_empty());
        assert!(!fifo.has_reader());
    }

    #[test]
    fn ioctl_reports_length_and_rejects_unknown_requests() {
        let sim = SimScheduler::new();
        let gate = PrivilegeGate::new(&sim);
        let fifo = FifoDevice::new();
        let device = Device::new("fifo", DeviceType::Character, DeviceNumber::new(240, 0));

        gate.run(|cx| {
            fifo.feed(cx, b"abc").unwrap();
            assert_eq!(fifo.ioctl(cx, device.handle(), Ioctl::Raw { request: I_FIFO_LEN, arg: 0 }), Ok(3));
            assert_eq!(fifo.ioctl(cx, device.handle(), Ioctl::Raw { request: 0x1234, arg: 0 }), Err(Errno::EINVAL));
            assert_eq!(fifo.ioctl(cx, device.handle(), Ioctl::Raw { request: I_FIFO_FLUSH, arg: 0 }), Ok(0));
        });
        assert!(fifo.is_empty());
    }
}
