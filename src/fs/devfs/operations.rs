//! Device Operations - Contrato de driver
//!
//! Todo dispositivo implementa `DeviceDriver`. `read`/`write` recebem o
//! descritor assíncrono (`AsyncOp`) e terminam de um de dois jeitos:
//!
//! - **Síncrono:** retornam `IoStatus::Complete(n)`. O callback do descritor
//!   NÃO pode ser chamado.
//! - **Assíncrono:** retornam `IoStatus::Pending` e, mais tarde, a partir do
//!   próprio caminho de conclusão (IRQ), gravam o resultado no `nbyte` do
//!   descritor e chamam `AsyncOp::complete` exatamente uma vez.
//!
//! `Err(errno)` significa que a transferência nem começou (dispositivo
//! ocupado, mal configurado).

use alloc::sync::Arc;

use bitflags::bitflags;

use super::async_op::AsyncOp;
use super::device::DeviceHandle;
use crate::sys::{DevResult, Errno, Location};
use crate::syscall::Privileged;

bitflags! {
    /// Flags de abertura/transferência (numeração POSIX)
    ///
    /// Sem `WRONLY`/`RDWR` o acesso é somente leitura.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        /// Apenas escrita
        const WRONLY   = 0o1;
        /// Leitura e escrita
        const RDWR     = 0o2;
        /// Criar se não existir
        const CREAT    = 0o100;
        /// Truncar ao abrir
        const TRUNC    = 0o1000;
        /// Append
        const APPEND   = 0o2000;
        /// Non-blocking
        const NONBLOCK = 0o4000;
    }
}

impl OpenFlags {
    /// Apenas leitura
    pub const RDONLY: Self = Self::empty();

    /// Verifica se tem flag de leitura
    pub const fn can_read(&self) -> bool {
        !self.contains(Self::WRONLY) || self.contains(Self::RDWR)
    }

    /// Verifica se tem flag de escrita
    pub const fn can_write(&self) -> bool {
        self.contains(Self::WRONLY) || self.contains(Self::RDWR)
    }

    pub const fn is_nonblocking(&self) -> bool {
        self.contains(Self::NONBLOCK)
    }
}

bitflags! {
    /// Eventos de hardware entregues ao callback de conclusão
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventFlags: u32 {
        /// Dados disponíveis (conclusão de leitura)
        const DATA_READY     = 1 << 0;
        /// Escrita concluída
        const WRITE_COMPLETE = 1 << 1;
        /// Transferência cancelada (resultado é sempre erro)
        const CANCELED       = 1 << 2;
        /// Erro de hardware
        const ERROR          = 1 << 3;
    }
}

/// Evento de conclusão
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McuEvent {
    pub flags: EventFlags,
    /// Canal de hardware que gerou o evento
    pub channel: Location,
}

impl McuEvent {
    pub const fn new(flags: EventFlags, channel: Location) -> Self {
        Self { flags, channel }
    }

    pub const fn is_canceled(&self) -> bool {
        self.flags.contains(EventFlags::CANCELED)
    }
}

/// Programação do gatilho de evento de um canal.
///
/// A camada de I/O só envia ações sem handler: "esqueça o gatilho de
/// `events` neste canal". O driver volta ao estado em que um evento futuro
/// rearma o gatilho.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McuAction {
    pub events: EventFlags,
    pub channel: Location,
}

impl McuAction {
    pub const fn new(events: EventFlags, channel: Location) -> Self {
        Self { events, channel }
    }
}

/// Requisições de controle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ioctl<'a> {
    /// Programa/limpa o gatilho de evento (I_MCU_SETACTION)
    SetAction(&'a McuAction),
    /// Requisição específica do driver
    Raw { request: u32, arg: usize },
}

/// Retorno síncrono de `read`/`write`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStatus {
    /// Concluída agora com `n` bytes (0 = fim dos dados)
    Complete(usize),
    /// Aceita; conclusão virá pelo callback do descritor
    Pending,
}

/// Contrato implementado por todo driver.
pub trait DeviceDriver: Send + Sync {
    /// Abre o dispositivo
    fn open(&self, _handle: &DeviceHandle) -> DevResult<()> {
        Ok(())
    }

    /// Fecha o dispositivo
    fn close(&self, _handle: &DeviceHandle) -> DevResult<()> {
        Ok(())
    }

    /// ioctl (controle de dispositivo)
    fn ioctl(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, _request: Ioctl<'_>) -> DevResult<usize> {
        Err(Errno::ENOTTY)
    }

    /// Inicia uma leitura para dentro do buffer do descritor
    ///
    /// No caminho assíncrono o `nbyte` final é a contagem de bytes ou
    /// `-errno` (`Errno::as_isize`). `-1` é `-EPERM`, não um cancelamento
    /// genérico: cancelar é `-ECANCELED` ou o evento `CANCELED`.
    fn read(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, _op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        Err(Errno::ENOSYS)
    }

    /// Inicia uma escrita a partir do buffer do descritor
    ///
    /// Mesmo contrato de `nbyte` que `read`.
    fn write(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, _op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        Err(Errno::ENOSYS)
    }
}
