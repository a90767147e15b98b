// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TCP reachability probe.
//!
//! The backend counts as reachable when a TCP connection to its address
//! opens within the timeout.

use std::io::ErrorKind;
use std::time::Duration;

use cs_engine::{ConnectivityProbe, ProbeError, ProbeFuture};
use tokio::net::TcpStream;

pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe {
            addr: addr.into(),
            timeout,
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn check(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await {
                Ok(Ok(_)) => Ok(true),
                Ok(Err(e)) if is_unreachable(e.kind()) => {
                    tracing::debug!(addr = %self.addr, error = %e, "backend unreachable");
                    Ok(false)
                }
                Ok(Err(e)) => Err(ProbeError(format!("{}: {}", self.addr, e))),
                Err(_) => {
                    tracing::debug!(addr = %self.addr, "reachability check timed out");
                    Ok(false)
                }
            }
        })
    }
}

fn is_unreachable(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NetworkUnreachable
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkDown
            | ErrorKind::TimedOut
            | ErrorKind::AddrNotAvailable
    )
}
