//! ZeroMQ stats feed transport

use std::time::Duration;

use super::StatsSource;
use crate::error::StatsError;

/// SUB socket with PLAIN authentication as user `stats`
pub struct ZmqSource {
    context: zmq::Context,
    socket: Option<zmq::Socket>,
}

impl ZmqSource {
    pub fn new() -> Self {
        Self {
            context: zmq::Context::new(),
            socket: None,
        }
    }
}

impl Default for ZmqSource {
    fn default() -> Self {
        Self::new()
    }
}

fn connect_error(e: zmq::Error) -> StatsError {
    StatsError::Connect(e.to_string())
}

fn receive_error(e: zmq::Error) -> StatsError {
    StatsError::Receive(e.to_string())
}

impl StatsSource for ZmqSource {
    fn connect(&mut self, address: &str, password: &str) -> Result<(), StatsError> {
        let socket = self.context.socket(zmq::SUB).map_err(connect_error)?;
        socket.set_plain_username(Some("stats")).map_err(connect_error)?;
        socket.set_plain_password(Some(password)).map_err(connect_error)?;
        socket.set_zap_domain("stats").map_err(connect_error)?;
        socket.connect(address).map_err(connect_error)?;
        socket.set_subscribe(b"").map_err(connect_error)?;
        self.socket = Some(socket);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Option<String>, StatsError> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| StatsError::Receive("not connected".to_string()))?;

        let ready = socket
            .poll(zmq::POLLIN, timeout.as_millis() as i64)
            .map_err(receive_error)?;
        if ready == 0 {
            return Ok(None);
        }

        match socket.recv_string(0).map_err(receive_error)? {
            Ok(text) => Ok(Some(text)),
            Err(bytes) => {
                tracing::warn!("Dropping stats message of {} bytes: not UTF-8", bytes.len());
                Ok(None)
            }
        }
    }

    fn disconnect(&mut self) {
        self.socket = None;
    }
}
