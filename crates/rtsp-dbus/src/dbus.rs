//! zbus-backed [`Transport`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zbus::blocking::fdo::{DBusProxy, PropertiesProxy};
use zbus::blocking::{connection, Connection};
use zbus::message::Message;
use zbus::names::{InterfaceName, WellKnownName};
use zbus::proxy::CacheProperties;
use zbus::zvariant::Value;

use crate::constants::{INTERFACE_NAME, OBJECT_PATH, SERVICE_NAME};
use crate::error::{ConnectionError, RemoteCallError};
use crate::property::PropertyValue;
use crate::proxy::{
    encoderError as EncoderError, hlsStateChanged as HlsStateChanged, ping as Ping,
    rtspClientCountChanged as RtspClientCountChanged, rtspStateChanged as RtspStateChanged,
    sourceStateChanged as SourceStateChanged, tcpBitrate as TcpBitrate,
    upstreamStateChanged as UpstreamStateChanged, uriParametersChanged as UriParametersChanged,
    RtspServerProxyBlocking,
};
use crate::transport::{Connector, MethodCall, MethodReply, ServiceSignal, SignalStream, Transport};

/// Which message bus to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// The system bus, where the server registers itself.
    #[default]
    System,
    /// The session bus (useful for a server run by hand during development).
    Session,
}

impl BusKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Session => "session",
        }
    }
}

/// Connects to the streaming server over a message bus.
#[derive(Debug, Clone, Default)]
pub struct DbusConnector {
    bus: BusKind,
    address: Option<String>,
}

impl DbusConnector {
    #[must_use]
    pub fn new(bus: BusKind) -> Self {
        Self { bus, address: None }
    }

    #[must_use]
    pub fn with_bus(mut self, bus: BusKind) -> Self {
        self.bus = bus;
        self
    }

    /// Connect to the bus at `address` instead of the well-known location,
    /// e.g. `unix:path=/run/dbus/system_bus_socket`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn bus(&self) -> BusKind {
        self.bus
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn open(&self) -> zbus::Result<Connection> {
        match (&self.address, self.bus) {
            (Some(address), _) => connection::Builder::address(address.as_str())?.build(),
            (None, BusKind::System) => Connection::system(),
            (None, BusKind::Session) => Connection::session(),
        }
    }
}

impl Connector for DbusConnector {
    fn connect(&self) -> Result<Box<dyn Transport>, ConnectionError> {
        let bus = self.bus.label();
        let connection = self
            .open()
            .map_err(|source| ConnectionError::Bus { bus, source })?;

        let lookup = |source| ConnectionError::NameLookup {
            name: SERVICE_NAME,
            source,
        };
        let registered = DBusProxy::new(&connection)
            .map_err(lookup)?
            .name_has_owner(WellKnownName::from_static_str_unchecked(SERVICE_NAME).into())
            .map_err(|e| lookup(e.into()))?;
        if !registered {
            return Err(ConnectionError::ServiceUnavailable { name: SERVICE_NAME });
        }

        let proxy_err = |source| ConnectionError::Proxy {
            path: OBJECT_PATH,
            source,
        };
        let control = RtspServerProxyBlocking::builder(&connection)
            .cache_properties(CacheProperties::No)
            .build()
            .map_err(proxy_err)?;
        let properties = PropertiesProxy::builder(&connection)
            .destination(SERVICE_NAME)
            .and_then(|b| b.path(OBJECT_PATH))
            .map_err(proxy_err)?
            .cache_properties(CacheProperties::No)
            .build()
            .map_err(proxy_err)?;

        info!(
            bus,
            unique_name = ?connection.unique_name(),
            service = SERVICE_NAME,
            "Bound to streaming server control object"
        );

        Ok(Box::new(DbusTransport {
            _connection: connection,
            control,
            properties,
        }))
    }
}

/// A live bus connection with proxies bound to the control object.
pub struct DbusTransport {
    _connection: Connection,
    control: RtspServerProxyBlocking<'static>,
    properties: PropertiesProxy<'static>,
}

fn interface_name() -> InterfaceName<'static> {
    InterfaceName::from_static_str_unchecked(INTERFACE_NAME)
}

/// The server declares every `state` argument as `b`.
fn wire_state(state: i32) -> bool {
    state != 0
}

/// The server declares ports as `u`.
fn wire_port(argument: &'static str, port: i32) -> Result<u32, RemoteCallError> {
    u32::try_from(port).map_err(|_| RemoteCallError::InvalidArgument {
        argument,
        value: port.to_string(),
    })
}

/// A [`MethodCall`] with its arguments converted to the declared wire types.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WireCall {
    EnableHls {
        state: bool,
        port: u32,
        user: String,
        pw: String,
    },
    EnableRtsp {
        state: bool,
        path: String,
        port: u32,
        user: String,
        pw: String,
    },
    EnableUpstream {
        state: bool,
        host: String,
        aport: u32,
        vport: u32,
    },
    SetResolution {
        width: i32,
        height: i32,
    },
}

impl TryFrom<MethodCall> for WireCall {
    type Error = RemoteCallError;

    fn try_from(call: MethodCall) -> Result<Self, Self::Error> {
        Ok(match call {
            MethodCall::EnableHls {
                state,
                port,
                user,
                pw,
            } => Self::EnableHls {
                state: wire_state(state),
                port: wire_port("port", port)?,
                user,
                pw,
            },
            MethodCall::EnableRtsp {
                state,
                path,
                port,
                user,
                pw,
            } => Self::EnableRtsp {
                state: wire_state(state),
                path,
                port: wire_port("port", port)?,
                user,
                pw,
            },
            MethodCall::EnableUpstream {
                state,
                host,
                aport,
                vport,
            } => Self::EnableUpstream {
                state: wire_state(state),
                host,
                aport: wire_port("aport", aport)?,
                vport: wire_port("vport", vport)?,
            },
            MethodCall::SetResolution { width, height } => Self::SetResolution { width, height },
        })
    }
}

fn from_wire_value(
    name: &'static str,
    value: &Value<'_>,
) -> Result<PropertyValue, RemoteCallError> {
    match value {
        Value::I32(v) => Ok(PropertyValue::Int(*v)),
        Value::Bool(v) => Ok(PropertyValue::Bool(*v)),
        Value::Str(v) => Ok(PropertyValue::Str(v.to_string())),
        other => Err(RemoteCallError::UnsupportedValue {
            property: name,
            signature: other.value_signature().to_string(),
        }),
    }
}

fn to_wire_value(value: PropertyValue) -> Value<'static> {
    match value {
        PropertyValue::Int(v) => Value::from(v),
        PropertyValue::Bool(v) => Value::from(v),
        PropertyValue::Str(v) => Value::from(v),
    }
}

impl Transport for DbusTransport {
    fn get_property(&self, name: &'static str) -> Result<PropertyValue, RemoteCallError> {
        debug!(property = name, "dbus get property");
        let value = self.properties.get(interface_name(), name)?;
        from_wire_value(name, &value)
    }

    fn set_property(
        &self,
        name: &'static str,
        value: PropertyValue,
    ) -> Result<(), RemoteCallError> {
        debug!(property = name, %value, "dbus set property");
        self.properties.set(interface_name(), name, to_wire_value(value))?;
        Ok(())
    }

    fn call(&self, call: MethodCall) -> Result<MethodReply, RemoteCallError> {
        let name = call.name();
        debug!(method = name, "dbus method call");
        let result = match WireCall::try_from(call)? {
            WireCall::EnableHls {
                state,
                port,
                user,
                pw,
            } => self.control.enable_hls(state, port, &user, &pw)?,
            WireCall::EnableRtsp {
                state,
                path,
                port,
                user,
                pw,
            } => self.control.enable_rtsp(state, &path, port, &user, &pw)?,
            WireCall::EnableUpstream {
                state,
                host,
                aport,
                vport,
            } => self.control.enable_upstream(state, &host, aport, vport)?,
            WireCall::SetResolution { width, height } => {
                self.control.set_resolution(width, height)?;
                return Ok(MethodReply::Unit);
            }
        };
        debug!(method = name, result, "dbus method returned");
        Ok(MethodReply::Result(result))
    }

    fn signals(&self) -> Result<SignalStream, RemoteCallError> {
        let messages = self.control.inner().receive_all_signals()?;
        Ok(Box::new(messages.filter_map(|msg| decode_signal(&msg))))
    }
}

/// Map a signal message onto [`ServiceSignal`] through the typed signal
/// wrappers. Foreign members and bodies that do not match the declared
/// signature are skipped.
fn decode_signal(msg: &Message) -> Option<ServiceSignal> {
    let decoded = if Ping::from_message(msg.clone()).is_some() {
        Ok(ServiceSignal::Ping)
    } else if EncoderError::from_message(msg.clone()).is_some() {
        Ok(ServiceSignal::EncoderError)
    } else if let Some(signal) = SourceStateChanged::from_message(msg.clone()) {
        signal
            .args()
            .map(|args| ServiceSignal::SourceStateChanged(args.state))
    } else if let Some(signal) = HlsStateChanged::from_message(msg.clone()) {
        signal
            .args()
            .map(|args| ServiceSignal::HlsStateChanged(args.state))
    } else if let Some(signal) = UpstreamStateChanged::from_message(msg.clone()) {
        signal
            .args()
            .map(|args| ServiceSignal::UpstreamStateChanged(args.state))
    } else if let Some(signal) = RtspStateChanged::from_message(msg.clone()) {
        signal
            .args()
            .map(|args| ServiceSignal::RtspStateChanged(args.state))
    } else if let Some(signal) = TcpBitrate::from_message(msg.clone()) {
        signal.args().map(|args| ServiceSignal::TcpBitrate(args.kbps))
    } else if let Some(signal) = RtspClientCountChanged::from_message(msg.clone()) {
        signal
            .args()
            .map(|args| ServiceSignal::RtspClientCountChanged {
                count: args.count,
                host: args.host.to_string(),
            })
    } else if let Some(signal) = UriParametersChanged::from_message(msg.clone()) {
        signal
            .args()
            .map(|args| ServiceSignal::UriParametersChanged(args.parameters.to_string()))
    } else {
        debug!(member = ?msg.header().member(), "ignoring unknown signal");
        return None;
    };

    match decoded {
        Ok(signal) => Some(signal),
        Err(err) => {
            warn!(member = ?msg.header().member(), "failed to decode signal: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::signal;

    #[test]
    fn state_argument_maps_to_boolean() {
        assert!(!wire_state(0));
        assert!(wire_state(1));
        assert!(wire_state(2));
    }

    #[test]
    fn negative_port_cannot_be_marshalled() {
        assert_eq!(wire_port("port", 8554).unwrap(), 8554);
        match wire_port("aport", -1) {
            Err(RemoteCallError::InvalidArgument { argument, value }) => {
                assert_eq!(argument, "aport");
                assert_eq!(value, "-1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn method_arguments_take_declared_wire_types() {
        let call = WireCall::try_from(MethodCall::EnableRtsp {
            state: 2,
            path: "stream".into(),
            port: 8554,
            user: "admin".into(),
            pw: "secret".into(),
        })
        .unwrap();
        assert_eq!(
            call,
            WireCall::EnableRtsp {
                state: true,
                path: "stream".into(),
                port: 8554,
                user: "admin".into(),
                pw: "secret".into(),
            }
        );

        let call = WireCall::try_from(MethodCall::EnableHls {
            state: 0,
            port: 8080,
            user: String::new(),
            pw: String::new(),
        })
        .unwrap();
        assert!(matches!(
            call,
            WireCall::EnableHls {
                state: false,
                port: 8080,
                ..
            }
        ));

        let call = WireCall::try_from(MethodCall::SetResolution {
            width: 1280,
            height: 720,
        })
        .unwrap();
        assert_eq!(
            call,
            WireCall::SetResolution {
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn upstream_ports_are_checked_individually() {
        let call = MethodCall::EnableUpstream {
            state: 1,
            host: "mediator".into(),
            aport: 5000,
            vport: -5,
        };
        match WireCall::try_from(call) {
            Err(RemoteCallError::InvalidArgument { argument, value }) => {
                assert_eq!(argument, "vport");
                assert_eq!(value, "-5");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn property_values_convert_both_ways() {
        assert_eq!(
            from_wire_value("videoBitrate", &Value::I32(4000)).unwrap(),
            PropertyValue::Int(4000)
        );
        assert_eq!(
            from_wire_value("autoBitrate", &Value::Bool(true)).unwrap(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            from_wire_value("uriParameters", &Value::from("?a=1")).unwrap(),
            PropertyValue::Str("?a=1".into())
        );

        assert_eq!(to_wire_value(PropertyValue::Int(25)), Value::I32(25));
        assert_eq!(to_wire_value(PropertyValue::Bool(false)), Value::Bool(false));
        assert_eq!(
            to_wire_value(PropertyValue::Str("x".into())),
            Value::from("x")
        );
    }

    #[test]
    fn unsupported_property_type_is_reported() {
        match from_wire_value("width", &Value::U32(1920)) {
            Err(RemoteCallError::UnsupportedValue {
                property,
                signature,
            }) => {
                assert_eq!(property, "width");
                assert_eq!(signature, "u");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn signal_message<B>(member: &str, body: &B) -> Message
    where
        B: Serialize + zbus::zvariant::DynamicType,
    {
        Message::signal(OBJECT_PATH, INTERFACE_NAME, member)
            .unwrap()
            .build(body)
            .unwrap()
    }

    #[test]
    fn signals_decode_to_typed_values() {
        assert_eq!(
            decode_signal(&signal_message(signal::PING, &())),
            Some(ServiceSignal::Ping)
        );
        assert_eq!(
            decode_signal(&signal_message(signal::ENCODER_ERROR, &())),
            Some(ServiceSignal::EncoderError)
        );
        assert_eq!(
            decode_signal(&signal_message(signal::SOURCE_STATE_CHANGED, &3i32)),
            Some(ServiceSignal::SourceStateChanged(3))
        );
        assert_eq!(
            decode_signal(&signal_message(signal::HLS_STATE_CHANGED, &2i32)),
            Some(ServiceSignal::HlsStateChanged(2))
        );
        assert_eq!(
            decode_signal(&signal_message(signal::UPSTREAM_STATE_CHANGED, &4i32)),
            Some(ServiceSignal::UpstreamStateChanged(4))
        );
        assert_eq!(
            decode_signal(&signal_message(signal::RTSP_STATE_CHANGED, &1i32)),
            Some(ServiceSignal::RtspStateChanged(1))
        );
        assert_eq!(
            decode_signal(&signal_message(signal::TCP_BITRATE, &1200i32)),
            Some(ServiceSignal::TcpBitrate(1200))
        );
        assert_eq!(
            decode_signal(&signal_message(
                signal::RTSP_CLIENT_COUNT_CHANGED,
                &(2i32, "10.0.0.7")
            )),
            Some(ServiceSignal::RtspClientCountChanged {
                count: 2,
                host: "10.0.0.7".into()
            })
        );
        assert_eq!(
            decode_signal(&signal_message(signal::URI_PARAMETERS_CHANGED, &"?bitrate=800")),
            Some(ServiceSignal::UriParametersChanged("?bitrate=800".into()))
        );
    }

    #[test]
    fn unknown_signals_are_skipped() {
        assert_eq!(decode_signal(&signal_message("rebooted", &())), None);

        let foreign = Message::signal(OBJECT_PATH, "org.example.Other", signal::PING)
            .unwrap()
            .build(&())
            .unwrap();
        assert_eq!(decode_signal(&foreign), None);
    }

    #[test]
    fn mistyped_signal_bodies_are_skipped() {
        assert_eq!(
            decode_signal(&signal_message(signal::TCP_BITRATE, &"fast")),
            None
        );
        assert_eq!(
            decode_signal(&signal_message(signal::RTSP_CLIENT_COUNT_CHANGED, &2i32)),
            None
        );
    }

    #[test]
    fn unreachable_bus_address_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("missing_bus_socket");
        let connector = DbusConnector::new(BusKind::System)
            .with_address(format!("unix:path={}", socket.display()));

        match connector.connect() {
            Err(ConnectionError::Bus { bus, .. }) => assert_eq!(bus, "system"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a socket that does not exist"),
        }
    }

    #[test]
    fn bus_kind_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            bus: BusKind,
        }
        let parsed: Wrapper = toml::from_str("bus = \"session\"").unwrap();
        assert_eq!(parsed.bus, BusKind::Session);
        assert_eq!(BusKind::default(), BusKind::System);
    }
}
