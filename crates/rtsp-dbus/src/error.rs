use crate::property::ValueType;

/// Failure to bind to the control object.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to connect to the {bus} bus")]
    Bus {
        bus: &'static str,
        #[source]
        source: zbus::Error,
    },

    #[error("failed to query the bus for '{name}'")]
    NameLookup {
        name: &'static str,
        #[source]
        source: zbus::Error,
    },

    #[error("service '{name}' is not registered on the bus")]
    ServiceUnavailable { name: &'static str },

    #[error("failed to create proxy for {path}")]
    Proxy {
        path: &'static str,
        #[source]
        source: zbus::Error,
    },
}

/// Failure of a property access or method call.
#[derive(Debug, thiserror::Error)]
pub enum RemoteCallError {
    #[error("not connected to the streaming server")]
    NotConnected,

    /// The service replied with a D-Bus error.
    #[error("{name}: {message}")]
    Rejected { name: String, message: String },

    #[error("D-Bus transport failure")]
    Transport(#[source] zbus::Error),

    #[error("property '{property}' returned {found}, expected {expected}")]
    UnexpectedType {
        property: &'static str,
        expected: ValueType,
        found: ValueType,
    },

    #[error("property '{property}' has unsupported D-Bus type '{signature}'")]
    UnsupportedValue {
        property: &'static str,
        signature: String,
    },

    /// An `enable*` reply carried no result flag.
    #[error("method '{method}' returned no result")]
    MissingResult { method: &'static str },

    /// An argument cannot be represented in the wire type.
    #[error("invalid argument {argument}={value}")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },
}

impl From<zbus::Error> for RemoteCallError {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, message, _) => Self::Rejected {
                name: name.to_string(),
                message: message.unwrap_or_default(),
            },
            zbus::Error::FDO(fdo) => Self::from(*fdo),
            other => Self::Transport(other),
        }
    }
}

impl From<zbus::fdo::Error> for RemoteCallError {
    fn from(err: zbus::fdo::Error) -> Self {
        match err {
            zbus::fdo::Error::ZBus(inner) => Self::from(inner),
            other => {
                let name = zbus::DBusError::name(&other).to_string();
                let message = zbus::DBusError::description(&other)
                    .map(str::to_string)
                    .unwrap_or_default();
                Self::Rejected { name, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fdo_failure_becomes_rejection() {
        let err = RemoteCallError::from(zbus::fdo::Error::Failed(
            "[RTSPserver] Invalid property 'bogus'".into(),
        ));
        match err {
            RemoteCallError::Rejected { name, message } => {
                assert_eq!(name, "org.freedesktop.DBus.Error.Failed");
                assert_eq!(message, "[RTSPserver] Invalid property 'bogus'");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unexpected_type_message() {
        let err = RemoteCallError::UnexpectedType {
            property: "autoBitrate",
            expected: ValueType::Bool,
            found: ValueType::Int32,
        };
        assert_eq!(
            err.to_string(),
            "property 'autoBitrate' returned int32, expected bool"
        );
    }
}
