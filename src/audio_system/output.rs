/// Audio output device
///
/// Owns the rodio `OutputStream`. The stream must outlive every port created
/// from it, so the front end keeps the `AudioOutput` alive for the whole run.
use rodio::{OutputStream, OutputStreamHandle};

use super::player::RodioPort;
use super::port::{MediaPort, PortFactory};
use crate::error::AudioError;

pub struct AudioOutput {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Open the default output device
    pub fn open_default() -> Result<Self, AudioError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|err| AudioError::StreamInitFailed(Box::new(err)))?;
        tracing::info!("Audio output stream opened");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    pub fn port_factory(&self) -> RodioPortFactory {
        RodioPortFactory {
            stream_handle: self.stream_handle.clone(),
        }
    }
}

/// Hands out `RodioPort`s that share one output stream
#[derive(Clone)]
pub struct RodioPortFactory {
    stream_handle: OutputStreamHandle,
}

impl PortFactory for RodioPortFactory {
    fn create_port(&self) -> Box<dyn MediaPort> {
        Box::new(RodioPort::new(self.stream_handle.clone()))
    }
}
