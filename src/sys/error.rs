//! # Standard Error Codes (Errno)
//!
//! Códigos de erro retornados pela camada de I/O e pelos drivers.
//! Baseado no padrão POSIX para que o erro chegue à libc sem tradução.
//!
//! ## 🎯 Propósito e Responsabilidade
//! - **Uniformidade:** Toda operação pública retorna `DevResult<T>`.
//! - **Propagação:** Drivers reportam erro assíncrono gravando o código
//!   negativo no `nbyte` do descritor; `from_negative` faz o caminho de volta.
//!
//! ## 🔍 Análise Crítica (Kernel Engineer's View)
//!
//! ### ✅ Pontos Fortes
//! - **Standard Compliance:** Numeração Linux/POSIX evita tabela de tradução.
//!
//! ### ⚠️ Pontos de Atenção
//! - **Códigos desconhecidos:** Um driver pode gravar um negativo que não está
//!   nesta tabela. `from_negative` degrada para `EIO` nesse caso (o erro nunca
//!   é engolido, mas perde a precisão).

/// Resultado padrão da camada de I/O
pub type DevResult<T> = Result<T, Errno>;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Errno {
    EPERM = 1,      // Operation not permitted
    ENOENT = 2,     // No such file or directory
    ESRCH = 3,      // No such process
    EINTR = 4,      // Interrupted system call
    EIO = 5,        // I/O error
    ENXIO = 6,      // No such device or address
    EBADF = 9,      // Bad file number
    EAGAIN = 11,    // Try again
    ENOMEM = 12,    // Out of memory
    EACCES = 13,    // Permission denied
    EFAULT = 14,    // Bad address
    EBUSY = 16,     // Device or resource busy
    EEXIST = 17,    // File exists
    ENODEV = 19,    // No such device
    EINVAL = 22,    // Invalid argument
    ENFILE = 23,    // File table overflow
    ENOTTY = 25,    // Not a typewriter
    ENOSPC = 28,    // No space left on device
    ESPIPE = 29,    // Illegal seek
    EROFS = 30,     // Read-only file system
    EPIPE = 32,     // Broken pipe
    ENOSYS = 38,    // Function not implemented
    ENODATA = 61,   // No data available
    ETIMEDOUT = 110, // Connection timed out
    ECANCELED = 125, // Operation Canceled
}

impl Errno {
    /// Código positivo (valor de `errno`)
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn as_usize(self) -> usize {
        self as usize
    }

    /// Valor negativo usado em retornos de syscall e no `nbyte` do descritor
    pub const fn as_isize(self) -> isize {
        -(self as i32) as isize
    }

    /// Converte um código positivo de volta para `Errno`.
    pub const fn from_code(code: i32) -> Option<Self> {
        let errno = match code {
            1 => Self::EPERM,
            2 => Self::ENOENT,
            3 => Self::ESRCH,
            4 => Self::EINTR,
            5 => Self::EIO,
            6 => Self::ENXIO,
            9 => Self::EBADF,
            11 => Self::EAGAIN,
            12 => Self::ENOMEM,
            13 => Self::EACCES,
            14 => Self::EFAULT,
            16 => Self::EBUSY,
            17 => Self::EEXIST,
            19 => Self::ENODEV,
            22 => Self::EINVAL,
            23 => Self::ENFILE,
            25 => Self::ENOTTY,
            28 => Self::ENOSPC,
            29 => Self::ESPIPE,
            30 => Self::EROFS,
            32 => Self::EPIPE,
            38 => Self::ENOSYS,
            61 => Self::ENODATA,
            110 => Self::ETIMEDOUT,
            125 => Self::ECANCELED,
            _ => return None,
        };
        Some(errno)
    }

    /// Converte um `nbyte` negativo (erro assíncrono) para `Errno`.
    ///
    /// Negativos fora da tabela viram `EIO`.
    pub const fn from_negative(value: isize) -> Self {
        if value >= 0 || value <= i32::MIN as isize {
            return Self::EIO;
        }
        match Self::from_code(-(value as i32)) {
            Some(errno) => errno,
            None => Self::EIO,
        }
    }

    /// Nome simbólico (para logs sem core::fmt)
    pub const fn name(self) -> &'static str {
        match self {
            Self::EPERM => "EPERM",
            Self::ENOENT => "ENOENT",
            Self::ESRCH => "ESRCH",
            Self::EINTR => "EINTR",
            Self::EIO => "EIO",
            Self::ENXIO => "ENXIO",
            Self::EBADF => "EBADF",
            Self::EAGAIN => "EAGAIN",
            Self::ENOMEM => "ENOMEM",
            Self::EACCES => "EACCES",
            Self::EFAULT => "EFAULT",
            Self::EBUSY => "EBUSY",
            Self::EEXIST => "EEXIST",
            Self::ENODEV => "ENODEV",
            Self::EINVAL => "EINVAL",
            Self::ENFILE => "ENFILE",
            Self::ENOTTY => "ENOTTY",
            Self::ENOSPC => "ENOSPC",
            Self::ESPIPE => "ESPIPE",
            Self::EROFS => "EROFS",
            Self::EPIPE => "EPIPE",
            Self::ENOSYS => "ENOSYS",
            Self::ENODATA => "ENODATA",
            Self::ETIMEDOUT => "ETIMEDOUT",
            Self::ECANCELED => "ECANCELED",
        }
    }
}
