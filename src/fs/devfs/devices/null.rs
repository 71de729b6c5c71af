//! /dev/null - Descarta tudo
//!
//! - Leitura: fim dos dados (0 bytes)
//! - Escrita: aceita e descarta

use alloc::sync::Arc;

use crate::fs::devfs::async_op::AsyncOp;
use crate::fs::devfs::device::DeviceHandle;
use crate::fs::devfs::operations::{DeviceDriver, IoStatus};
use crate::sys::DevResult;
use crate::syscall::Privileged;

/// Driver de /dev/null
pub struct NullDevice;

impl DeviceDriver for NullDevice {
    fn read(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, _op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        Ok(IoStatus::Complete(0))
    }

    fn write(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        Ok(IoStatus::Complete(op.requested()))
    }
}
