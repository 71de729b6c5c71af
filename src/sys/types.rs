//! Tipos fundamentais do sistema

/// Thread ID
///
/// Índice direto na tabela de tasks do scheduler. A task 0 é o kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tid(pub u32);

impl Tid {
    /// Task do kernel (nunca espera em dispositivos)
    pub const KERNEL: Tid = Tid(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Índice na tabela de tasks
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Prioridade de escalonamento (maior valor = mais urgente)
pub type Priority = u8;

/// Posição da transferência dentro do dispositivo.
///
/// Para dispositivos de bloco é o endereço; para dispositivos de caractere é
/// o canal de hardware (também usado ao reprogramar o gatilho de evento).
pub type Location = u32;
