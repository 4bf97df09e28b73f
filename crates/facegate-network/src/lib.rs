//! Network layer for the facegate door unit.
//!
//! Two concerns live here:
//!
//! - [`ConnectivityManager`]: brings the network link up with a bounded
//!   number of status polls and reports whether it is usable.
//! - [`RecognitionClient`]: one bounded HTTP exchange with the recognition
//!   service per call, classified into a verdict or a [`RecognitionError`].
//!
//! Both are generic over a narrow capability trait ([`NetworkLink`],
//! [`HttpTransport`]) so the access loop can run against mocks.
//!
//! ```no_run
//! use facegate_core::{DeviceConfig, ImagePayload};
//! use facegate_network::{ConnectivityManager, RecognitionClient};
//! use facegate_network::link::HostLink;
//! use facegate_network::transport::ReqwestTransport;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeviceConfig::default();
//! let link = HostLink::new(&config.network.interface, &config.service.recognize_url)?;
//! let mut network = ConnectivityManager::new(link, &config.network);
//! network.connect(&config.network.credentials).await;
//!
//! let client = RecognitionClient::new(ReqwestTransport::new(), &config.service);
//! let verdict = client.recognize(&network, &ImagePayload::empty()).await?;
//! println!("authenticated: {}", verdict.authenticated);
//! # Ok(())
//! # }
//! ```

pub mod connectivity;
pub mod error;
pub mod link;
pub mod mock;
pub mod recognition;
pub mod transport;

pub use connectivity::{ConnectionStatus, ConnectivityManager};
pub use error::{ConnectivityError, RecognitionError, TransportError};
pub use link::{AnyLink, HostLink, LinkStatus, NetworkLink};
pub use recognition::{RecognitionClient, RecognitionRequest, RecognitionResponse, ServiceHealth};
pub use transport::{AnyTransport, HttpResponse, HttpTransport, ReqwestTransport};
