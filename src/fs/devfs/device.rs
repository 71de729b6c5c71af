//! Device - Nó de dispositivo e tipos base

use alloc::sync::Arc;
use core::fmt;

use super::operations::DeviceDriver;

/// Tipo de dispositivo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// Dispositivo de caractere (char device)
    Character,
    /// Dispositivo de bloco (block device)
    Block,
}

/// Número major/minor de dispositivo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceNumber {
    /// Major number (identifica o driver)
    pub major: u32,
    /// Minor number (identifica o dispositivo específico)
    pub minor: u32,
}

impl DeviceNumber {
    /// Cria um novo device number
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Converte para u64 (formato Linux: major << 20 | minor)
    pub const fn as_u64(&self) -> u64 {
        ((self.major as u64) << 20) | (self.minor as u64)
    }

    /// Cria a partir de u64
    pub const fn from_u64(dev: u64) -> Self {
        Self {
            major: (dev >> 20) as u32,
            minor: (dev & 0xFFFFF) as u32,
        }
    }
}

/// Handle entregue ao driver em toda operação.
///
/// `port` seleciona a instância de hardware quando um driver atende várias
/// (UART0, UART1, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle {
    pub number: DeviceNumber,
    pub port: u32,
}

/// Nó de dispositivo
pub struct Device {
    name: &'static str,
    device_type: DeviceType,
    handle: DeviceHandle,
    /// Driver vinculado. Sem driver, transferências falham com ENXIO.
    driver: Option<Arc<dyn DeviceDriver>>,
}

impl Device {
    /// Cria um nó sem driver, na porta 0
    pub fn new(name: &'static str, device_type: DeviceType, number: DeviceNumber) -> Self {
        Self {
            name,
            device_type,
            handle: DeviceHandle { number, port: 0 },
            driver: None,
        }
    }

    pub fn with_port(mut self, port: u32) -> Self {
        self.handle.port = port;
        self
    }

    pub fn with_driver(mut self, driver: Arc<dyn DeviceDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn number(&self) -> DeviceNumber {
        self.handle.number
    }

    pub fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    pub fn driver(&self) -> Option<&Arc<dyn DeviceDriver>> {
        self.driver.as_ref()
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("type", &self.device_type)
            .field("major", &self.handle.number.major)
            .field("minor", &self.handle.number.minor)
            .field("port", &self.handle.port)
            .field("bound", &self.driver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_number_packs_like_linux() {
        let dev = DeviceNumber::new(10, 135);
        assert_eq!(dev.as_u64(), (10 << 20) | 135);
        assert_eq!(DeviceNumber::from_u64(dev.as_u64()), dev);
    }

    #[test]
    fn builder_sets_port_and_keeps_number() {
        let dev = Device::new("ttyS1", DeviceType::Character, DeviceNumber::new(4, 65)).with_port(1);

        assert_eq!(dev.handle().port, 1);
        assert_eq!(dev.number(), DeviceNumber::new(4, 65));
        assert!(dev.driver().is_none());
    }
}
