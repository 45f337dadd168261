//! Dialling the console endpoint.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use hatch_config::ConsoleEndpoint;

use crate::AppError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn connect(endpoint: &ConsoleEndpoint) -> Result<TcpStream, AppError> {
    let address =
        resolve_tcp_address(endpoint.host(), endpoint.port()).map_err(|source| {
            AppError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

    TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT).map_err(|source| AppError::Connect {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
