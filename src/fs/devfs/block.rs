//! Block objects - identidade dos canais de espera
//!
//! Um block object não é uma alocação: é o par `(dispositivo, direção)`.
//! Duas leituras no mesmo dispositivo caem no mesmo canal e acordam juntas;
//! uma leitura e uma escrita no mesmo dispositivo são canais distintos.

use super::device::DeviceNumber;
use super::operations::EventFlags;

/// Direção da transferência
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    pub const fn from_is_read(is_read: bool) -> Self {
        if is_read {
            Self::Read
        } else {
            Self::Write
        }
    }

    /// Evento de hardware que conclui uma transferência nesta direção
    pub const fn event_flags(self) -> EventFlags {
        match self {
            Self::Read => EventFlags::DATA_READY,
            Self::Write => EventFlags::WRITE_COMPLETE,
        }
    }
}

/// Canal de espera `{device, direction}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockObject {
    device: DeviceNumber,
    direction: Direction,
}

impl BlockObject {
    pub const fn new(device: DeviceNumber, direction: Direction) -> Self {
        Self { device, direction }
    }

    pub const fn device(&self) -> DeviceNumber {
        self.device
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }
}
