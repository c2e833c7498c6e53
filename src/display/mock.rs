//! Recording bus double for protocol tests.

use super::bus::{BusError, DisplayBus};
use super::gpio::GpioError;

/// One observed bus operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Reset,
    Command(u8),
    Data(Vec<u8>),
    WaitIdle,
}

/// Records every transaction; optionally reports a stuck BUSY line
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub log: Vec<Transaction>,
    pub stuck_busy: bool,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose BUSY line never releases
    pub fn stuck() -> Self {
        Self {
            log: Vec::new(),
            stuck_busy: true,
        }
    }

    /// Data bytes sent after `command`, up to the next command
    pub fn data_after(&self, command: u8) -> Vec<u8> {
        self.log
            .iter()
            .skip_while(|t| **t != Transaction::Command(command))
            .skip(1)
            .take_while(|t| !matches!(t, Transaction::Command(_)))
            .filter_map(|t| match t {
                Transaction::Data(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Command bytes in the order they were sent
    pub fn commands(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transaction::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl DisplayBus for RecordingBus {
    fn reset(&mut self) -> Result<(), BusError> {
        self.log.push(Transaction::Reset);
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), BusError> {
        self.log.push(Transaction::Command(command));
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        self.log.push(Transaction::Data(data.to_vec()));
        Ok(())
    }

    fn wait_until_idle(&mut self) -> Result<(), BusError> {
        self.log.push(Transaction::WaitIdle);
        if self.stuck_busy {
            return Err(GpioError::BusyTimeout(30_000).into());
        }
        Ok(())
    }
}
