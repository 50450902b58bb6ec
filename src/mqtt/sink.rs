use super::messages::CoverCommand;
use crate::dispatch::CoverCommandSink;
use crate::error::CoverError;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Hands commands to the device link task without waiting on it.
#[derive(Debug, Clone)]
pub struct ChannelCommandSink {
    tx: mpsc::Sender<CoverCommand>,
}

impl ChannelCommandSink {
    pub fn new(tx: mpsc::Sender<CoverCommand>) -> Self {
        Self { tx }
    }

    fn submit(&self, command: CoverCommand) -> Result<(), CoverError> {
        self.tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(cmd) => {
                CoverError::DispatchFailure(format!("command queue full, dropped {:?}", cmd))
            }
            TrySendError::Closed(_) => {
                CoverError::DispatchFailure("device link is not running".to_string())
            }
        })
    }
}

impl CoverCommandSink for ChannelCommandSink {
    fn set_position(&mut self, entity: &str, percent: u8) -> Result<(), CoverError> {
        self.submit(CoverCommand::SetPosition {
            entity: entity.to_string(),
            percent,
        })
    }

    fn stop(&mut self, entity: &str) -> Result<(), CoverError> {
        self.submit(CoverCommand::Stop {
            entity: entity.to_string(),
        })
    }
}
