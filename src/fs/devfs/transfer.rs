//! # Transfer Coordinator
//!
//! Transforma a transferência assíncrona de um driver em um `read`/`write`
//! bloqueante para a task.
//!
//! ## Fluxo de uma rodada
//!
//! 1. Cria um `TransferRequest` novo e um descritor (`AsyncOp`) apontando
//!    para ele como handler de conclusão.
//! 2. Numa única entrada no gate: chama `read`/`write` do driver e logo em
//!    seguida `check_complete`. Uma conclusão instantânea não pode escapar
//!    entre as duas chamadas.
//! 3. Enquanto a rodada estiver `Armed` (a task acordou mas o callback desta
//!    rodada não rodou): se foi um sinal e não há dados (`nbyte == 0`),
//!    desiste com `EINTR` e limpa o gatilho de evento do canal. Caso
//!    contrário volta a dormir. A decisão e o abandono acontecem na mesma
//!    entrada no gate; se o driver concluir a rodada durante o abandono, o
//!    resultado é classificado normalmente em vez de `EINTR`.
//! 4. Classifica o resultado. Só uma conclusão com zero bytes em modo
//!    bloqueante faz o laço dar outra volta.
//!
//! ## 🔍 Análise Crítica
//!
//! ### ⚠️ Pontos de Atenção
//! - **Bounce buffer:** Cada rodada aloca um buffer do tamanho pedido. Para
//!   transferências grandes isso dobra o uso de memória.
//! - **Sem retry de erro:** Erros do driver sobem direto; política de retry é
//!   de quem chama.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;

use super::async_op::{AsyncOp, CompletionHandler};
use super::block::{BlockObject, Direction};
use super::completion::{CallOutcome, RequestStatus, TransferRequest};
use super::device::Device;
use super::operations::{IoStatus, Ioctl, McuAction, OpenFlags};
use crate::sched::UnblockType;
use crate::sys::{DevResult, Errno, Location, Tid};
use crate::syscall::{PrivilegeGate, Privileged};

/// Buffer do chamador, já com a direção
pub enum TransferBuf<'b> {
    Read(&'b mut [u8]),
    Write(&'b [u8]),
}

impl TransferBuf<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Read(buf) => buf.len(),
            Self::Write(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Read(_) => Direction::Read,
            Self::Write(_) => Direction::Write,
        }
    }

    /// Buffer do descritor: zerado para leitura, cópia para escrita
    fn bounce(&self) -> Box<[u8]> {
        match self {
            Self::Read(buf) => vec![0u8; buf.len()].into_boxed_slice(),
            Self::Write(buf) => Box::from(&buf[..]),
        }
    }

    /// Entrega `n` bytes ao chamador e retorna quantos foram entregues.
    fn finish(&mut self, op: &AsyncOp, n: usize) -> usize {
        let n = n.min(self.len());
        if let Self::Read(dst) = self {
            let src = op.buffer();
            let n = n.min(src.len());
            dst[..n].copy_from_slice(&src[..n]);
            return n;
        }
        n
    }
}

pub struct TransferCoordinator<'a> {
    gate: &'a PrivilegeGate<'a>,
}

impl<'a> TransferCoordinator<'a> {
    pub const fn new(gate: &'a PrivilegeGate<'a>) -> Self {
        Self { gate }
    }

    pub fn read(&self, device: &Device, flags: OpenFlags, loc: Location, buf: &mut [u8]) -> DevResult<usize> {
        self.transfer(device, flags, loc, TransferBuf::Read(buf))
    }

    pub fn write(&self, device: &Device, flags: OpenFlags, loc: Location, buf: &[u8]) -> DevResult<usize> {
        self.transfer(device, flags, loc, TransferBuf::Write(buf))
    }

    /// Executa a transferência e só retorna com um resultado definitivo.
    pub fn transfer(
        &self,
        device: &Device,
        flags: OpenFlags,
        loc: Location,
        mut buf: TransferBuf<'_>,
    ) -> DevResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let channel = BlockObject::new(device.number(), buf.direction());
        let scheduler = self.gate.scheduler();
        let tid = scheduler.current_task_id();

        loop {
            let request = Arc::new(TransferRequest::new(channel));
            let handler: Arc<dyn CompletionHandler> = request.clone();
            let op = Arc::new(AsyncOp::new(loc, flags, tid, buf.bounce(), Some(handler)));

            self.gate.run(|cx| {
                issue(cx, device, channel.direction(), &request, &op);
                request.check_complete(cx, &op);
            });

            while request.status() == RequestStatus::Armed {
                let interrupted = self.gate.run(|cx| {
                    let signaled = request.status() == RequestStatus::Armed
                        && scheduler.last_wake_reason(tid) == UnblockType::Signal
                        && op.nbyte() == 0;
                    if !signaled {
                        request.check_complete(cx, &op);
                        return false;
                    }
                    abandon(cx, device, tid, channel, loc);
                    // Conclusão entregue durante o abandono vence o sinal
                    !request.is_done()
                });
                if interrupted {
                    kdebug!("(DevIO) Espera interrompida por sinal: tid=", tid.as_u32());
                    return Err(Errno::EINTR);
                }
            }

            match request.outcome() {
                CallOutcome::NotRun => {
                    kerror!("(DevIO) Driver nunca executou: dev=", device.number().as_u64());
                    return Err(Errno::ENXIO);
                }
                CallOutcome::Failed(errno) => return Err(errno),
                CallOutcome::Started(IoStatus::Complete(n)) => return Ok(buf.finish(&op, n)),
                CallOutcome::Started(IoStatus::Pending) => {
                    let nbyte = op.nbyte();
                    if nbyte > 0 {
                        return Ok(buf.finish(&op, nbyte as usize));
                    }
                    if nbyte < 0 {
                        return Err(Errno::from_negative(nbyte));
                    }
                    if op.is_nonblocking() {
                        return Err(Errno::ENODATA);
                    }
                    ktrace!("(DevIO) Conclusão sem dados, nova rodada: tid=", tid.as_u32());
                }
            }
        }
    }
}

/// Chama o driver e grava o resultado na rodada.
fn issue(cx: &Privileged<'_>, device: &Device, direction: Direction, request: &TransferRequest, op: &Arc<AsyncOp>) {
    let Some(driver) = device.driver() else {
        return;
    };

    let result = match direction {
        Direction::Read => driver.read(cx, device.handle(), op),
        Direction::Write => driver.write(cx, device.handle(), op),
    };

    request.set_outcome(match result {
        Ok(status) => CallOutcome::Started(status),
        Err(errno) => {
            kdebug!("(DevIO) Driver recusou transferência: errno=", errno.code());
            CallOutcome::Failed(errno)
        }
    });
}

/// Desiste da espera: sai do canal e pede ao driver para esquecer o gatilho
/// de evento, para que o próximo evento rearme normalmente.
fn abandon(cx: &Privileged<'_>, device: &Device, tid: Tid, channel: BlockObject, loc: Location) {
    cx.scheduler().set_wait_channel(cx, tid, None);

    let Some(driver) = device.driver() else {
        return;
    };
    let action = McuAction::new(channel.direction().event_flags(), loc);
    if let Err(errno) = driver.ioctl(cx, device.handle(), Ioctl::SetAction(&action)) {
        kwarn!("(DevIO) Falha ao limpar gatilho de evento: errno=", errno.code());
    }
}
