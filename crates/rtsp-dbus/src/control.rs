//! [`ControlClient`]: typed access to the streaming server's control object.
//!
//! Every accessor is a single blocking round trip through the bound
//! [`Transport`]. Nothing is cached, validated or retried.

use tracing::{debug, info};

use crate::dbus::{BusKind, DbusConnector};
use crate::error::{ConnectionError, RemoteCallError};
use crate::property::{PropertyKey, PropertyValue};
use crate::transport::{Connector, MethodCall, MethodReply, SignalStream, Transport};
use crate::types::Resolution;

/// Arguments for `enableHLS`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HlsRequest {
    pub state: i32,
    pub port: i32,
    pub user: String,
    pub pw: String,
}

impl HlsRequest {
    #[must_use]
    pub fn new(state: impl Into<i32>) -> Self {
        Self {
            state: state.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn port(mut self, port: i32) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, pw: impl Into<String>) -> Self {
        self.user = user.into();
        self.pw = pw.into();
        self
    }
}

/// Arguments for `enableRTSP`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtspRequest {
    pub state: i32,
    pub path: String,
    pub port: i32,
    pub user: String,
    pub pw: String,
}

impl RtspRequest {
    #[must_use]
    pub fn new(state: impl Into<i32>) -> Self {
        Self {
            state: state.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: i32) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, pw: impl Into<String>) -> Self {
        self.user = user.into();
        self.pw = pw.into();
        self
    }
}

/// Arguments for `enableUpstream`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub state: i32,
    pub host: String,
    pub aport: i32,
    pub vport: i32,
}

impl UpstreamRequest {
    #[must_use]
    pub fn new(state: impl Into<i32>) -> Self {
        Self {
            state: state.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn ports(mut self, aport: i32, vport: i32) -> Self {
        self.aport = aport;
        self.vport = vport;
        self
    }
}

/// Client for the `com.dreambox.RTSPserver` control object.
///
/// The connection is established on construction and is either fully bound
/// or absent. Calls made while it is absent fail with
/// [`RemoteCallError::NotConnected`].
///
/// Not synchronised: share between threads only behind a lock.
pub struct ControlClient<C: Connector = DbusConnector> {
    connector: C,
    handle: Option<Box<dyn Transport>>,
}

impl ControlClient<DbusConnector> {
    /// Connect to the server on the system bus.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the bus or the service is unreachable.
    pub fn system() -> Result<Self, ConnectionError> {
        Self::new(DbusConnector::new(BusKind::System))
    }
}

impl<C: Connector> ControlClient<C> {
    /// Bind to the control object through `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the connector cannot bind.
    pub fn new(connector: C) -> Result<Self, ConnectionError> {
        let handle = connector.connect()?;
        Ok(Self {
            connector,
            handle: Some(handle),
        })
    }

    /// Drop the current connection and bind a new one.
    ///
    /// On failure the client is left disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the connector cannot bind.
    pub fn reconnect(&mut self) -> Result<(), ConnectionError> {
        self.handle = None;
        self.handle = Some(self.connector.connect()?);
        info!("Reconnected to streaming server");
        Ok(())
    }

    /// Drop the current connection.
    pub fn disconnect(&mut self) {
        if self.handle.take().is_some() {
            debug!("Disconnected from streaming server");
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn transport(&self) -> Result<&dyn Transport, RemoteCallError> {
        self.handle.as_deref().ok_or(RemoteCallError::NotConnected)
    }

    // -- Generic access --

    /// Read `key` and return the value as the server sent it.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn get_property(&self, key: PropertyKey) -> Result<PropertyValue, RemoteCallError> {
        self.transport()?.get_property(key.name())
    }

    /// Write `value` to `key`. Range and access are checked by the server only.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_property(
        &self,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> Result<(), RemoteCallError> {
        self.transport()?.set_property(key.name(), value.into())
    }

    fn get_i32(&self, key: PropertyKey) -> Result<i32, RemoteCallError> {
        let value = self.get_property(key)?;
        value.as_i32().ok_or_else(|| type_mismatch(key, &value))
    }

    fn get_bool(&self, key: PropertyKey) -> Result<bool, RemoteCallError> {
        let value = self.get_property(key)?;
        value.as_bool().ok_or_else(|| type_mismatch(key, &value))
    }

    // -- Encoder --

    /// See [`InputMode`](crate::InputMode) for the known values.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn input_mode(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::InputMode)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_input_mode(&self, mode: impl Into<i32>) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::InputMode, mode.into())
    }

    /// Audio bitrate in kbit/s.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn audio_bitrate(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::AudioBitrate)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_audio_bitrate(&self, kbps: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::AudioBitrate, kbps)
    }

    /// Video bitrate in kbit/s.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn video_bitrate(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::VideoBitrate)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_video_bitrate(&self, kbps: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::VideoBitrate, kbps)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn framerate(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::Framerate)
    }

    /// See [`framerate`](crate::types::framerate) for the known rates.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_framerate(&self, fps: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::Framerate, fps)
    }

    /// Read width, then height.
    ///
    /// Two separate reads: a change on the server between them yields a
    /// mixed pair.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or either read fails.
    pub fn resolution(&self) -> Result<Resolution, RemoteCallError> {
        let width = self.get_i32(PropertyKey::Width)?;
        let height = self.get_i32(PropertyKey::Height)?;
        Ok(Resolution::new(width, height))
    }

    /// Set both dimensions with one `setResolution` call.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the server rejects the size.
    pub fn set_resolution(&self, width: i32, height: i32) -> Result<(), RemoteCallError> {
        self.transport()?
            .call(MethodCall::SetResolution { width, height })?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn auto_bitrate(&self) -> Result<bool, RemoteCallError> {
        self.get_bool(PropertyKey::AutoBitrate)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_auto_bitrate(&self, enable: bool) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::AutoBitrate, enable)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn gop_length(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::GopLength)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_gop_length(&self, length: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::GopLength, length)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn gop_on_scene_change(&self) -> Result<bool, RemoteCallError> {
        self.get_bool(PropertyKey::GopOnSceneChange)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_gop_on_scene_change(&self, enable: bool) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::GopOnSceneChange, enable)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn open_gop(&self) -> Result<bool, RemoteCallError> {
        self.get_bool(PropertyKey::OpenGop)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_open_gop(&self, enable: bool) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::OpenGop, enable)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn b_frames(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::BFrames)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_b_frames(&self, frames: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::BFrames, frames)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn p_frames(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::PFrames)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_p_frames(&self, frames: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::PFrames, frames)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn slices(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::Slices)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_slices(&self, slices: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::Slices, slices)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn profile(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::Profile)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_profile(&self, profile: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::Profile, profile)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn level(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::Level)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the write is rejected.
    pub fn set_level(&self, level: i32) -> Result<(), RemoteCallError> {
        self.set_property(PropertyKey::Level, level)
    }

    // -- Read-only state --

    /// See [`SourceState`](crate::SourceState).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn source_state(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::SourceState)
    }

    /// See [`RtspState`](crate::RtspState).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn rtsp_state(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::RtspState)
    }

    /// See [`UpstreamState`](crate::UpstreamState).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn upstream_state(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::UpstreamState)
    }

    /// See [`HlsState`](crate::HlsState).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn hls_state(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::HlsState)
    }

    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn rtsp_client_count(&self) -> Result<i32, RemoteCallError> {
        self.get_i32(PropertyKey::RtspClientCount)
    }

    /// Query string the most recent RTSP client connected with.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the read fails.
    pub fn uri_parameters(&self) -> Result<String, RemoteCallError> {
        match self.get_property(PropertyKey::UriParameters)? {
            PropertyValue::Str(v) => Ok(v),
            other => Err(type_mismatch(PropertyKey::UriParameters, &other)),
        }
    }

    // -- Methods --

    /// Start or stop the HLS server. Returns the server's result flag.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the call fails.
    pub fn enable_hls(&self, request: HlsRequest) -> Result<bool, RemoteCallError> {
        let HlsRequest {
            state,
            port,
            user,
            pw,
        } = request;
        self.invoke(MethodCall::EnableHls {
            state,
            port,
            user,
            pw,
        })
    }

    /// Start or stop the RTSP server. Returns the server's result flag.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the call fails.
    pub fn enable_rtsp(&self, request: RtspRequest) -> Result<bool, RemoteCallError> {
        let RtspRequest {
            state,
            path,
            port,
            user,
            pw,
        } = request;
        self.invoke(MethodCall::EnableRtsp {
            state,
            path,
            port,
            user,
            pw,
        })
    }

    /// Start or stop the TCP upstream. Returns the server's result flag.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the call fails.
    pub fn enable_upstream(&self, request: UpstreamRequest) -> Result<bool, RemoteCallError> {
        let UpstreamRequest {
            state,
            host,
            aport,
            vport,
        } = request;
        self.invoke(MethodCall::EnableUpstream {
            state,
            host,
            aport,
            vport,
        })
    }

    fn invoke(&self, call: MethodCall) -> Result<bool, RemoteCallError> {
        let method = call.name();
        match self.transport()?.call(call)? {
            MethodReply::Result(result) => Ok(result),
            MethodReply::Unit => Err(RemoteCallError::MissingResult { method }),
        }
    }

    /// Subscribe to the server's signals.
    ///
    /// The stream stays tied to the connection it was created on and ends
    /// when that connection goes away.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteCallError`] if disconnected or the subscription fails.
    pub fn signals(&self) -> Result<SignalStream, RemoteCallError> {
        self.transport()?.signals()
    }
}

fn type_mismatch(key: PropertyKey, value: &PropertyValue) -> RemoteCallError {
    RemoteCallError::UnexpectedType {
        property: key.name(),
        expected: key.value_type(),
        found: value.value_type(),
    }
}
