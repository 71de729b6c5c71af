//! /dev/zero - Retorna zeros
//!
//! Dispositivo essencial do kernel.
//! - Leitura: sempre retorna zeros
//! - Escrita: descarta dados (como /dev/null)

use alloc::sync::Arc;

use crate::fs::devfs::async_op::AsyncOp;
use crate::fs::devfs::device::DeviceHandle;
use crate::fs::devfs::operations::{DeviceDriver, IoStatus};
use crate::sys::DevResult;
use crate::syscall::Privileged;

/// Driver de /dev/zero
pub struct ZeroDevice;

impl DeviceDriver for ZeroDevice {
    fn read(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        let mut buf = op.buffer();
        buf.fill(0);
        Ok(IoStatus::Complete(buf.len()))
    }

    fn write(&self, _cx: &Privileged<'_>, _handle: &DeviceHandle, op: &Arc<AsyncOp>) -> DevResult<IoStatus> {
        Ok(IoStatus::Complete(op.requested()))
    }
}
