//! Sistema de arquivos de dispositivos.
//!
//! Submódulos:
//! - `devfs`: Registro de dispositivos, contrato de driver e coordenador de
//!   transferência.

pub mod devfs;
