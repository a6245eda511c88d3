use std::io::{self, ErrorKind};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use log::{debug, info, trace};

use crate::config::ServerConfig;
use crate::telemetry::{decode, parse_document, RawDocument};
use crate::types::EyesSample;

use super::error::{FetchError, TransportError};

/// OpenIris 遥测服务器的同步 UDP 客户端
///
/// 一问一答：每次 fetch 发送请求口令，然后阻塞等待一个回复数据报，最长等待配置的超时。
/// fetch 方法取 `&mut self`，同一时刻最多只有一个未完成的请求。
#[derive(Debug)]
pub struct OpenIrisClient {
    socket: UdpSocket,
    server: SocketAddr,
    request_token: Vec<u8>,
    recv_buffer: Vec<u8>,
    timeout: Duration,
}

impl OpenIrisClient {
    pub fn connect(config: &ServerConfig) -> Result<Self, TransportError> {
        let address = config.address();
        let candidates: Vec<SocketAddr> = address
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                address: address.clone(),
                source,
            })?
            .collect();
        // OpenIris 只监听 IPv4；localhost 可能先解析出 ::1
        let server = candidates
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| TransportError::NoAddress(address.clone()))?;

        let local: SocketAddr = if server.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).map_err(TransportError::Bind)?;
        socket.set_read_timeout(Some(config.timeout()))?;
        socket.connect(server)?;

        info!("Connected to telemetry server {} ({})", address, server);

        Ok(Self {
            socket,
            server,
            request_token: config.request_token.as_bytes().to_vec(),
            recv_buffer: vec![0u8; config.max_datagram_bytes],
            timeout: config.timeout(),
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 发送请求并等待一条回复，返回 UTF-8 文本
    pub fn fetch_raw(&mut self) -> Result<String, TransportError> {
        self.socket
            .send(&self.request_token)
            .map_err(|e| self.classify(e))?;

        let received = self
            .socket
            .recv(&mut self.recv_buffer)
            .map_err(|e| self.classify(e))?;

        let text = std::str::from_utf8(&self.recv_buffer[..received])?;
        trace!("Received {} bytes from {}", received, self.server);
        Ok(text.to_string())
    }

    fn classify(&self, e: io::Error) -> TransportError {
        match e.kind() {
            // Unix 上读超时报 WouldBlock，Windows 上报 TimedOut
            ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout {
                timeout_ms: self.timeout.as_millis(),
            },
            // 已连接的 UDP socket 会把 ICMP 端口不可达报告给下一次 send/recv
            ErrorKind::ConnectionRefused => TransportError::Refused { server: self.server },
            _ => TransportError::Io(e),
        }
    }

    pub fn fetch_document(&mut self) -> Result<RawDocument, FetchError> {
        let text = self.fetch_raw()?;
        Ok(parse_document(&text)?)
    }

    /// `fetch_raw` + 解析 + 解码
    pub fn fetch_typed(&mut self) -> Result<EyesSample, FetchError> {
        let doc = self.fetch_document()?;
        Ok(decode(&doc))
    }

    pub fn close(self) {
        debug!("Closing connection to {}", self.server);
        drop(self.socket);
    }
}
