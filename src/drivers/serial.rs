// =============================================================================
// SERIAL SINK - ZERO OVERHEAD
// =============================================================================
//
// Saída serial usada pelos macros de log (kinfo!, kerror!, ...).
//
// ARQUITETURA:
// A camada de I/O não conhece a UART do alvo. A plataforma instala, uma única
// vez durante o boot, um `SerialPort` que sabe enviar um byte. Até isso
// acontecer, tudo que é emitido é descartado silenciosamente.
//
// - SEM core::fmt - hex é convertido na mão, nibble a nibble
// - SEM alocação
// - SEM lock no caminho de escrita (apenas um `Once` lido)
//
// FUNÇÕES DISPONÍVEIS:
// - install(port)    : Registra a porta serial da plataforma
// - emit(byte)       : Envia um byte
// - emit_str(s)      : Envia string
// - emit_hex(v)      : Envia u64 em hexadecimal (0x + 16 dígitos)
// - emit_nl()        : Envia newline (\r\n)
//
// NOTA IMPORTANTE:
// Não há exclusão mútua entre emissores. Linhas vindas de uma IRQ podem se
// intercalar com linhas de task. Isso é aceitável para debugging.
//
// =============================================================================

use spin::Once;

/// Porta serial fornecida pela plataforma (UART, semihosting, stdout no host).
pub trait SerialPort: Sync {
    /// Envia um único byte. Pode fazer busy-wait no registrador de status.
    fn write_byte(&self, byte: u8);
}

static PORT: Once<&'static dyn SerialPort> = Once::new();

/// Registra a porta serial. Apenas a primeira chamada tem efeito.
///
/// Retorna `true` se esta chamada instalou a porta.
pub fn install(port: &'static dyn SerialPort) -> bool {
    let mut installed = false;
    PORT.call_once(|| {
        installed = true;
        port
    });
    installed
}

/// Indica se já existe uma porta instalada.
pub fn is_installed() -> bool {
    PORT.get().is_some()
}

// =============================================================================
// FUNÇÕES DE ESCRITA - CORE
// =============================================================================

/// Envia um único byte para a porta serial.
#[inline(always)]
pub fn emit(byte: u8) {
    if let Some(port) = PORT.get() {
        port.write_byte(byte);
    }
}

/// Envia uma string para a porta serial.
#[inline(never)]
pub fn emit_str(s: &str) {
    if let Some(port) = PORT.get() {
        for byte in s.bytes() {
            port.write_byte(byte);
        }
    }
}

/// Envia uma nova linha (CRLF).
#[inline(never)]
pub fn emit_nl() {
    emit(b'\r');
    emit(b'\n');
}

// =============================================================================
// FUNÇÕES DE ESCRITA - FORMATAÇÃO NUMÉRICA
// =============================================================================

/// Envia um valor u64 em formato hexadecimal.
///
/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres)
#[inline(never)]
pub fn emit_hex(value: u64) {
    if let Some(port) = PORT.get() {
        for byte in hex_digits(value) {
            port.write_byte(byte);
        }
    }
}

/// Converte `value` para `0x` + 16 dígitos hexadecimais maiúsculos.
pub const fn hex_digits(value: u64) -> [u8; 18] {
    let mut out = [0u8; 18];
    out[0] = b'0';
    out[1] = b'x';

    let mut i = 0;
    while i < 16 {
        let shift = 60 - (i * 4);
        let nibble = ((value >> shift) & 0xF) as u8;
        out[2 + i] = if nibble < 10 {
            b'0' + nibble
        } else {
            b'A' + (nibble - 10)
        };
        i += 1;
    }

    out
}
