//! Client for the dreambox RTSP streaming server's D-Bus control interface.
//!
//! The server registers `com.dreambox.RTSPserver` on the system bus and
//! exposes its encoder settings as properties and its RTSP, HLS and
//! upstream handlers as methods. [`ControlClient`] relays property reads,
//! writes and method calls to it one blocking call at a time.
//!
//! ```no_run
//! use rtsp_dbus::{ControlClient, RtspRequest, RtspState};
//!
//! let client = ControlClient::system()?;
//! client.set_video_bitrate(4000)?;
//! client.enable_rtsp(RtspRequest::new(RtspState::Running).path("stream").port(8554))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod constants;
pub mod control;
pub mod dbus;
pub mod error;
pub mod property;
pub mod proxy;
pub mod transport;
pub mod types;

pub use config::ClientConfig;
pub use control::{ControlClient, HlsRequest, RtspRequest, UpstreamRequest};
pub use dbus::{BusKind, DbusConnector};
pub use error::{ConnectionError, RemoteCallError};
pub use property::{Access, PropertyKey, PropertyValue, ValueType};
pub use transport::{Connector, MethodCall, MethodReply, ServiceSignal, SignalStream, Transport};
pub use types::{HlsState, InputMode, Resolution, RtspState, SourceState, UpstreamState};
