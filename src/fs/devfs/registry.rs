//! Device Registry - Registro de dispositivos

use alloc::sync::Arc;

use super::device::{Device, DeviceNumber};
use crate::sys::{DevResult, Errno};

/// Número máximo de dispositivos
pub const MAX_DEVICES: usize = 32;

/// Registro de dispositivos
pub struct DeviceRegistry {
    /// Array de dispositivos registrados
    devices: [Option<Arc<Device>>; MAX_DEVICES],
    /// Contador de dispositivos
    count: usize,
}

impl DeviceRegistry {
    /// Cria um novo registro
    pub const fn new() -> Self {
        const NONE: Option<Arc<Device>> = None;
        Self {
            devices: [NONE; MAX_DEVICES],
            count: 0,
        }
    }

    /// Registra um dispositivo
    pub fn register(&mut self, device: Device) -> DevResult<Arc<Device>> {
        if self.lookup(device.name()).is_some() || self.lookup_by_dev(device.number()).is_some() {
            kwarn!("(DevFS) Dispositivo duplicado: dev=", device.number().as_u64());
            return Err(Errno::EEXIST);
        }

        let Some(slot) = self.devices.iter_mut().find(|slot| slot.is_none()) else {
            kerror!("(DevFS) Registro de dispositivos cheio");
            return Err(Errno::ENFILE);
        };

        let device = Arc::new(device);
        *slot = Some(device.clone());
        self.count += 1;
        Ok(device)
    }

    /// Remove um dispositivo
    pub fn unregister(&mut self, dev: DeviceNumber) -> DevResult<Arc<Device>> {
        let slot = self
            .devices
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|d| d.number() == dev))
            .ok_or(Errno::ENODEV)?;

        self.count -= 1;
        slot.take().ok_or(Errno::ENODEV)
    }

    /// Busca um dispositivo por nome (aceita o prefixo `/dev/`)
    pub fn lookup(&self, name: &str) -> Option<Arc<Device>> {
        let name = name.strip_prefix("/dev/").unwrap_or(name);
        self.iter().find(|d| d.name() == name).cloned()
    }

    /// Busca um dispositivo por device number
    pub fn lookup_by_dev(&self, dev: DeviceNumber) -> Option<Arc<Device>> {
        self.iter().find(|d| d.number() == dev).cloned()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.iter().flatten()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
