//! DevFS - Device Filesystem
//!
//! Camada de I/O de dispositivos: registro de nós, contrato de driver e o
//! coordenador que transforma transferências assíncronas em `read`/`write`
//! bloqueantes.
//!
//! # Arquitetura
//!
//! ```text
//! DevFs::read ──► TransferCoordinator ──► PrivilegeGate::run
//!                        ▲                      │ driver.read + check_complete
//!                        │                      ▼
//!                        └── TransferRequest (callback) ◄── IRQ do driver
//! ```
//!
//! # Módulos
//!
//! - `device` - Nó de dispositivo e tipos base
//! - `operations` - Contrato de driver, flags e eventos
//! - `block` - Identidade dos canais de espera
//! - `async_op` - Descritor de operação assíncrona
//! - `completion` - Estado da rodada e callback de conclusão
//! - `transfer` - Coordenador de transferência
//! - `registry` - Registro de dispositivos
//! - `devices/*` - Dispositivos embutidos

pub mod async_op;
pub mod block;
pub mod completion;
pub mod device;
pub mod devices;
pub mod operations;
pub mod registry;
pub mod transfer;

// Re-exports públicos
pub use async_op::{AsyncOp, CompletionHandler};
pub use block::{BlockObject, Direction};
pub use completion::{CallOutcome, RequestStatus, TransferRequest};
pub use device::{Device, DeviceHandle, DeviceNumber, DeviceType};
pub use operations::{DeviceDriver, EventFlags, IoStatus, Ioctl, McuAction, McuEvent, OpenFlags};
pub use registry::{DeviceRegistry, MAX_DEVICES};
pub use transfer::{TransferBuf, TransferCoordinator};

use alloc::sync::Arc;

use spin::Mutex;

use crate::sys::{DevResult, Errno, Location};
use crate::syscall::PrivilegeGate;

// Constantes de dispositivos (major/minor numbers do Linux)

/// /dev/null - descarta tudo
pub const DEV_NULL: DeviceNumber = DeviceNumber::new(1, 3);

/// /dev/zero - retorna zeros
pub const DEV_ZERO: DeviceNumber = DeviceNumber::new(1, 5);

/// /dev/fifo - loopback assíncrono (major local/experimental)
pub const DEV_FIFO: DeviceNumber = DeviceNumber::new(240, 0);

/// Dispositivo aberto
#[derive(Debug, Clone)]
pub struct OpenDevice {
    device: Arc<Device>,
    flags: OpenFlags,
}

impl OpenDevice {
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }
}

/// DevFS - Device Filesystem
pub struct DevFs<'a> {
    gate: &'a PrivilegeGate<'a>,
    /// Registro de dispositivos
    registry: Mutex<DeviceRegistry>,
}

impl<'a> DevFs<'a> {
    /// Cria uma DevFS vazia
    pub fn new(gate: &'a PrivilegeGate<'a>) -> Self {
        Self {
            gate,
            registry: Mutex::new(DeviceRegistry::new()),
        }
    }

    /// Cria uma DevFS com null, zero e fifo registrados
    pub fn with_builtin_devices(gate: &'a PrivilegeGate<'a>) -> DevResult<Self> {
        let devfs = Self::new(gate);
        devfs.register_builtin_devices()?;
        Ok(devfs)
    }

    /// Registra dispositivos essenciais do kernel
    fn register_builtin_devices(&self) -> DevResult<()> {
        kinfo!("(DevFS) Registrando dispositivos embutidos...");
        self.register(
            Device::new("null", DeviceType::Character, DEV_NULL).with_driver(Arc::new(devices::NullDevice)),
        )?;
        self.register(
            Device::new("zero", DeviceType::Character, DEV_ZERO).with_driver(Arc::new(devices::ZeroDevice)),
        )?;
        self.register(
            Device::new("fifo", DeviceType::Character, DEV_FIFO).with_driver(Arc::new(devices::FifoDevice::new())),
        )?;
        kok!("(DevFS) Dispositivos embutidos registrados");
        Ok(())
    }

    /// Registra um dispositivo
    pub fn register(&self, device: Device) -> DevResult<Arc<Device>> {
        let device = self.registry.lock().register(device)?;
        kdebug!("(DevFS) Registrado dev=", device.number().as_u64());
        Ok(device)
    }

    /// Remove um dispositivo
    pub fn unregister(&self, dev: DeviceNumber) -> DevResult<Arc<Device>> {
        self.registry.lock().unregister(dev)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Device>> {
        self.registry.lock().lookup(name)
    }

    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Abre um dispositivo por nome
    pub fn open(&self, name: &str, flags: OpenFlags) -> DevResult<OpenDevice> {
        let device = self.lookup(name).ok_or(Errno::ENODEV)?;
        if let Some(driver) = device.driver() {
            self.gate.run(|_cx| driver.open(device.handle()))?;
        }
        Ok(OpenDevice { device, flags })
    }

    /// Fecha um dispositivo
    pub fn close(&self, file: OpenDevice) -> DevResult<()> {
        match file.device.driver() {
            Some(driver) => self.gate.run(|_cx| driver.close(file.device.handle())),
            None => Ok(()),
        }
    }

    /// Requisição de controle, executada dentro do gate
    pub fn ioctl(&self, file: &OpenDevice, request: Ioctl<'_>) -> DevResult<usize> {
        let driver = file.device.driver().ok_or(Errno::ENXIO)?;
        self.gate.run(|cx| driver.ioctl(cx, file.device.handle(), request))
    }

    /// Lê de um dispositivo (bloqueia, exceto com `NONBLOCK`)
    pub fn read(&self, file: &OpenDevice, loc: Location, buf: &mut [u8]) -> DevResult<usize> {
        if !file.flags.can_read() {
            return Err(Errno::EBADF);
        }
        TransferCoordinator::new(self.gate).read(&file.device, file.flags, loc, buf)
    }

    /// Escreve em um dispositivo
    pub fn write(&self, file: &OpenDevice, loc: Location, buf: &[u8]) -> DevResult<usize> {
        if !file.flags.can_write() {
            return Err(Errno::EBADF);
        }
        TransferCoordinator::new(self.gate).write(&file.device, file.flags, loc, buf)
    }
}
