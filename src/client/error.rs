use std::io;
use std::net::SocketAddr;

use crate::telemetry::DecodeError;

/// 传输层错误：超时或 socket I/O 失败，总是带着底层原因
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot resolve {address}: {source}")]
    Resolve { address: String, source: io::Error },
    #[error("{0} did not resolve to any address")]
    NoAddress(String),
    #[error("cannot open UDP socket: {0}")]
    Bind(io::Error),
    #[error("{server} refused the request (is OpenIris running?)")]
    Refused { server: SocketAddr },
    #[error("no reply within {timeout_ms} ms")]
    Timeout { timeout_ms: u128 },
    #[error("socket I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("reply is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    /// 服务器端口没有监听（ICMP 端口不可达）
    pub fn is_refused(&self) -> bool {
        matches!(self, TransportError::Refused { .. })
    }
}

/// [`OpenIrisClient::fetch_typed`](super::OpenIrisClient::fetch_typed) 的错误
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
