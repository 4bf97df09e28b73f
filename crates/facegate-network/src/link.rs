//! Network link capability.
//!
//! [`NetworkLink`] is the narrow slice of the network stack the connectivity
//! manager needs: start connecting, report whether the link is up, report the
//! local address, and let go. [`HostLink`] implements it on a Linux host where
//! the operating system owns association; [`MockLink`](crate::mock::MockLink)
//! implements it for tests.

#![allow(async_fn_in_trait)]

use std::net::IpAddr;
use std::path::PathBuf;

use facegate_core::Credentials;
use reqwest::Url;
use tokio::fs;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::ConnectivityError;
use crate::mock::MockLink;

/// Default sysfs network root.
pub const SYSFS_NET_ROOT: &str = "/sys/class/net";

/// Link-layer status as reported by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Down,
    Up,
}

/// Network link.
///
/// # Object Safety
///
/// Not object-safe (native `async fn`). Use generics or [`AnyLink`].
pub trait NetworkLink: Send + Sync {
    /// Start bringing the link up. Returns once the attempt is under way.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::Link`] if the stack refuses to start.
    async fn begin(&mut self, credentials: &Credentials) -> Result<(), ConnectivityError>;

    /// Current link status. Must not block on the network.
    async fn status(&mut self) -> LinkStatus;

    /// Address assigned to this host on the link, if any.
    async fn local_addr(&mut self) -> Option<IpAddr>;

    /// Let go of the link.
    async fn disconnect(&mut self);
}

/// Link managed by the host operating system.
///
/// Association and addressing are handled by the OS network service, so
/// `begin` only records the request. Status comes from the interface's
/// `operstate`, and the local address is discovered by routing a UDP socket
/// toward the recognition service.
#[derive(Debug, Clone)]
pub struct HostLink {
    interface: String,
    net_root: PathBuf,
    probe_host: String,
    probe_port: u16,
}

impl HostLink {
    /// Watch `interface`; derive the probe target from `service_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::Link`] if the URL has no host.
    pub fn new(interface: impl Into<String>, service_url: &str) -> Result<Self, ConnectivityError> {
        let url = Url::parse(service_url)
            .map_err(|e| ConnectivityError::Link(format!("Invalid service URL: {e}")))?;
        let probe_host = url
            .host_str()
            .ok_or_else(|| ConnectivityError::Link(format!("No host in {service_url}")))?
            .to_string();
        let probe_port = url.port_or_known_default().unwrap_or(80);

        Ok(Self {
            interface: interface.into(),
            net_root: PathBuf::from(SYSFS_NET_ROOT),
            probe_host,
            probe_port,
        })
    }

    /// Read interface state from an alternate sysfs root.
    pub fn with_net_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.net_root = root.into();
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl NetworkLink for HostLink {
    async fn begin(&mut self, credentials: &Credentials) -> Result<(), ConnectivityError> {
        info!(
            interface = %self.interface,
            ssid = %credentials.ssid,
            "Waiting for host network (association is managed by the OS)"
        );
        Ok(())
    }

    async fn status(&mut self) -> LinkStatus {
        let path = self.net_root.join(&self.interface).join("operstate");
        match fs::read_to_string(&path).await {
            Ok(state) if state.trim() == "up" => LinkStatus::Up,
            Ok(state) => {
                debug!(interface = %self.interface, state = state.trim(), "Link not up");
                LinkStatus::Down
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cannot read operstate");
                LinkStatus::Down
            }
        }
    }

    async fn local_addr(&mut self) -> Option<IpAddr> {
        // connect() on UDP sends nothing; it only selects a route.
        let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
        if let Err(e) = socket
            .connect((self.probe_host.as_str(), self.probe_port))
            .await
        {
            warn!(error = %e, "Cannot route toward recognition service");
            return None;
        }
        socket.local_addr().ok().map(|addr| addr.ip())
    }

    async fn disconnect(&mut self) {
        info!(interface = %self.interface, "Releasing host network");
    }
}

/// Enum wrapper for link dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyLink {
    Host(HostLink),
    Mock(MockLink),
}

impl NetworkLink for AnyLink {
    async fn begin(&mut self, credentials: &Credentials) -> Result<(), ConnectivityError> {
        match self {
            Self::Host(link) => link.begin(credentials).await,
            Self::Mock(link) => link.begin(credentials).await,
        }
    }

    async fn status(&mut self) -> LinkStatus {
        match self {
            Self::Host(link) => link.status().await,
            Self::Mock(link) => link.status().await,
        }
    }

    async fn local_addr(&mut self) -> Option<IpAddr> {
        match self {
            Self::Host(link) => link.local_addr().await,
            Self::Mock(link) => link.local_addr().await,
        }
    }

    async fn disconnect(&mut self) {
        match self {
            Self::Host(link) => link.disconnect().await,
            Self::Mock(link) => link.disconnect().await,
        }
    }
}
