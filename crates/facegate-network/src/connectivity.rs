//! Connectivity manager.
//!
//! Owns the network link lifecycle: connect with a bounded number of status
//! polls, answer "are we connected" from the last known state, and tear the
//! link down. A failed connect is not fatal; the manager stays usable and
//! `connect` can be called again.
//!
//! # Example
//!
//! ```
//! use facegate_core::{ConnectivityState, NetworkConfig};
//! use facegate_network::ConnectivityManager;
//! use facegate_network::mock::MockLink;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let config = NetworkConfig::default();
//! let mut manager = ConnectivityManager::new(MockLink::up_after(3), &config);
//!
//! let state = manager.connect(&config.credentials).await;
//! assert_eq!(state, ConnectivityState::Connected);
//! assert!(manager.is_connected());
//! # }
//! ```

use std::net::IpAddr;
use std::time::Duration;

use facegate_core::{ConnectivityState, Credentials, NetworkConfig};
use tracing::{debug, info, warn};

use crate::error::ConnectivityError;
use crate::link::{LinkStatus, NetworkLink};

/// Anything that can answer "is the link up" without touching the network.
pub trait ConnectionStatus {
    fn is_connected(&self) -> bool;
}

impl ConnectionStatus for ConnectivityState {
    fn is_connected(&self) -> bool {
        matches!(self, ConnectivityState::Connected)
    }
}

/// Link lifecycle owner.
#[derive(Debug)]
pub struct ConnectivityManager<L> {
    link: L,
    state: ConnectivityState,
    interval: Duration,
    attempts: u32,
    local_addr: Option<IpAddr>,
    last_error: Option<ConnectivityError>,
}

impl<L: NetworkLink> ConnectivityManager<L> {
    /// Create a manager in the `Disconnected` state.
    pub fn new(link: L, config: &NetworkConfig) -> Self {
        Self {
            link,
            state: ConnectivityState::Disconnected,
            interval: config.connect_interval,
            attempts: config.connect_attempts,
            local_addr: None,
            last_error: None,
        }
    }

    /// Bring the link up.
    ///
    /// Polls link status every `connect_interval`, at most
    /// `connect_attempts` times, so the call never waits longer than
    /// `connect_attempts × connect_interval`. Returns `Connected` or
    /// `Disconnected`.
    pub async fn connect(&mut self, credentials: &Credentials) -> ConnectivityState {
        info!(ssid = %credentials.ssid, "Connecting to network");
        self.state = ConnectivityState::Connecting;
        self.local_addr = None;

        if let Err(e) = self.link.begin(credentials).await {
            return self.fail(e);
        }

        let mut polls = 0;
        while self.link.status().await != LinkStatus::Up {
            if polls == self.attempts {
                let waited = self.interval * self.attempts;
                return self.fail(ConnectivityError::NotEstablished {
                    attempts: self.attempts,
                    waited_ms: waited.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.interval).await;
            polls += 1;
            debug!(attempt = polls, max = self.attempts, "Waiting for link");
        }

        self.local_addr = self.link.local_addr().await;
        self.state = ConnectivityState::Connected;
        self.last_error = None;

        match self.local_addr {
            Some(addr) => info!(%addr, "Network connected"),
            None => info!("Network connected (local address unknown)"),
        }
        self.state
    }

    fn fail(&mut self, error: ConnectivityError) -> ConnectivityState {
        warn!(error = %error, "Network connection failed");
        self.state = ConnectivityState::Disconnected;
        self.last_error = Some(error);
        self.state
    }

    /// Read link status once and follow it.
    ///
    /// A connected link that dropped is downgraded; a disconnected link that
    /// came up on its own (late association after a failed `connect`) is
    /// promoted. Never calls `begin`.
    pub async fn refresh(&mut self) -> ConnectivityState {
        match (self.state, self.link.status().await) {
            (ConnectivityState::Connected, LinkStatus::Down) => {
                warn!("Network link dropped");
                self.state = ConnectivityState::Disconnected;
                self.local_addr = None;
            }
            (ConnectivityState::Disconnected, LinkStatus::Up) => {
                self.local_addr = self.link.local_addr().await;
                self.state = ConnectivityState::Connected;
                self.last_error = None;
                info!(addr = ?self.local_addr, "Network link came up");
            }
            _ => {}
        }
        self.state
    }

    /// Last known state, without touching the link.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Address assigned on the last successful connect.
    pub fn local_addr(&self) -> Option<IpAddr> {
        self.local_addr
    }

    /// Why the last connect failed, if it did.
    pub fn last_error(&self) -> Option<&ConnectivityError> {
        self.last_error.as_ref()
    }

    /// Tear the link down. Idempotent.
    pub async fn disconnect(&mut self) {
        if self.state != ConnectivityState::Disconnected {
            self.link.disconnect().await;
            info!("Network disconnected");
        }
        self.state = ConnectivityState::Disconnected;
        self.local_addr = None;
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

impl<L: NetworkLink> ConnectionStatus for ConnectivityManager<L> {
    fn is_connected(&self) -> bool {
        ConnectivityManager::is_connected(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;
    use tokio::time::Instant;

    fn config() -> NetworkConfig {
        NetworkConfig::default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_link_does_not_wait() {
        let config = config();
        let mut manager = ConnectivityManager::new(MockLink::up_after(0), &config);

        let start = Instant::now();
        assert_eq!(
            manager.connect(&config.credentials).await,
            ConnectivityState::Connected
        );
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(manager.local_addr().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_up_after_polls() {
        let config = config();
        let mut manager = ConnectivityManager::new(MockLink::up_after(4), &config);

        let start = Instant::now();
        manager.connect(&config.credentials).await;

        assert!(manager.is_connected());
        assert_eq!(start.elapsed(), config.connect_interval * 4);
        assert!(manager.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted() {
        let config = config();
        let mut manager = ConnectivityManager::new(MockLink::never_up(), &config);

        let start = Instant::now();
        let state = manager.connect(&config.credentials).await;

        assert_eq!(state, ConnectivityState::Disconnected);
        assert_eq!(start.elapsed(), config.connect_budget());
        assert_eq!(
            manager.last_error(),
            Some(&ConnectivityError::NotEstablished {
                attempts: 20,
                waited_ms: 10_000
            })
        );
        assert!(manager.local_addr().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_failure() {
        let config = config();
        let mut manager =
            ConnectivityManager::new(MockLink::rejecting("radio disabled"), &config);

        let start = Instant::now();
        assert_eq!(
            manager.connect(&config.credentials).await,
            ConnectivityState::Disconnected
        );
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(matches!(
            manager.last_error(),
            Some(ConnectivityError::Link(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_failure() {
        let config = NetworkConfig {
            connect_attempts: 2,
            ..config()
        };
        let mut manager = ConnectivityManager::new(MockLink::up_after(3), &config);

        assert!(!manager.is_connected());
        manager.connect(&config.credentials).await;
        assert!(!manager.is_connected());

        // Status polls carry over, so the link is up on the second try.
        manager.connect(&config.credentials).await;
        assert!(manager.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_detects_drop() {
        let config = config();
        let link = MockLink::up_after(0);
        let handle = link.handle();
        let mut manager = ConnectivityManager::new(link, &config);
        manager.connect(&config.credentials).await;

        assert_eq!(manager.refresh().await, ConnectivityState::Connected);
        handle.drop_link();
        assert_eq!(manager.refresh().await, ConnectivityState::Disconnected);
        assert!(!manager.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_picks_up_late_link() {
        let config = config();
        let link = MockLink::up_after(25);
        let handle = link.handle();
        let mut manager = ConnectivityManager::new(link, &config);

        assert_eq!(
            manager.connect(&config.credentials).await,
            ConnectivityState::Disconnected
        );
        assert_eq!(handle.status_polls(), 21);

        for _ in 0..4 {
            assert_eq!(manager.refresh().await, ConnectivityState::Disconnected);
        }
        assert_eq!(manager.refresh().await, ConnectivityState::Connected);
        assert!(manager.is_connected());
        assert!(manager.local_addr().is_some());
        assert!(manager.last_error().is_none());
        assert_eq!(handle.begins(), 1);
    }

    #[tokio::test]
    async fn test_is_connected_does_not_poll() {
        let config = config();
        let link = MockLink::up_after(0);
        let handle = link.handle();
        let manager = ConnectivityManager::new(link, &config);

        assert!(!manager.is_connected());
        assert_eq!(handle.status_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_is_idempotent() {
        let config = config();
        let link = MockLink::up_after(0);
        let handle = link.handle();
        let mut manager = ConnectivityManager::new(link, &config);
        manager.connect(&config.credentials).await;

        manager.disconnect().await;
        manager.disconnect().await;

        assert_eq!(manager.state(), ConnectivityState::Disconnected);
        assert_eq!(handle.disconnects(), 1);
    }

    #[test]
    fn test_connectivity_state_as_status() {
        assert!(ConnectivityState::Connected.is_connected());
        assert!(!ConnectivityState::Connecting.is_connected());
        assert!(!ConnectivityState::Disconnected.is_connected());
    }
}
