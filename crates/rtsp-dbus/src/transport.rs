//! The seam between [`ControlClient`](crate::ControlClient) and the bus.
//!
//! A [`Connector`] produces a freshly bound [`Transport`]; the client owns
//! exactly one transport at a time and replaces it wholesale on reconnect.

use crate::constants::method;
use crate::error::{ConnectionError, RemoteCallError};
use crate::property::PropertyValue;

/// A remote method invocation with its arguments in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodCall {
    EnableHls {
        state: i32,
        port: i32,
        user: String,
        pw: String,
    },
    EnableRtsp {
        state: i32,
        path: String,
        port: i32,
        user: String,
        pw: String,
    },
    EnableUpstream {
        state: i32,
        host: String,
        aport: i32,
        vport: i32,
    },
    SetResolution {
        width: i32,
        height: i32,
    },
}

impl MethodCall {
    /// Method name on the bus.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnableHls { .. } => method::ENABLE_HLS,
            Self::EnableRtsp { .. } => method::ENABLE_RTSP,
            Self::EnableUpstream { .. } => method::ENABLE_UPSTREAM,
            Self::SetResolution { .. } => method::SET_RESOLUTION,
        }
    }
}

/// What a method call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodReply {
    /// The `enable*` methods report success as a boolean.
    Result(bool),
    /// `setResolution` has no out arguments.
    Unit,
}

/// A signal emitted by the streaming server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceSignal {
    /// Watchdog heartbeat.
    Ping,
    SourceStateChanged(i32),
    HlsStateChanged(i32),
    UpstreamStateChanged(i32),
    /// Measured upstream bitrate in kbit/s.
    TcpBitrate(i32),
    RtspClientCountChanged { count: i32, host: String },
    UriParametersChanged(String),
    RtspStateChanged(i32),
    EncoderError,
}

/// Blocking stream of signals.
pub type SignalStream = Box<dyn Iterator<Item = ServiceSignal>>;

/// A bound connection to the control object.
pub trait Transport {
    /// `org.freedesktop.DBus.Properties.Get` on the control interface.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if the call fails or is rejected.
    fn get_property(&self, name: &'static str) -> Result<PropertyValue, RemoteCallError>;

    /// `org.freedesktop.DBus.Properties.Set` on the control interface.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if the call fails or is rejected.
    fn set_property(&self, name: &'static str, value: PropertyValue)
        -> Result<(), RemoteCallError>;

    /// Invoke a method on the control interface.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if the call fails or is rejected.
    fn call(&self, call: MethodCall) -> Result<MethodReply, RemoteCallError>;

    /// Subscribe to the signals of the control interface.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if the match rule cannot be registered.
    fn signals(&self) -> Result<SignalStream, RemoteCallError>;
}

/// Builds transports.
pub trait Connector {
    /// Bind a new transport to the control object.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the bus or the service is unreachable.
    fn connect(&self) -> Result<Box<dyn Transport>, ConnectionError>;
}
