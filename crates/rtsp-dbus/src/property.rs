//! Remote property keys and values.
//!
//! Every key maps to the property name on the bus, the D-Bus type the
//! server uses for it and whether the server accepts writes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// D-Bus type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// `i`
    Int32,
    /// `b`
    Bool,
    /// `s`
    Str,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "int32"),
            Self::Bool => write!(f, "bool"),
            Self::Str => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::ReadWrite => write!(f, "readwrite"),
        }
    }
}

/// A property exposed by the control interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    InputMode,
    AudioBitrate,
    VideoBitrate,
    Framerate,
    Width,
    Height,
    RtspState,
    UpstreamState,
    AutoBitrate,
    SourceState,
    HlsState,
    GopLength,
    GopOnSceneChange,
    OpenGop,
    BFrames,
    PFrames,
    Slices,
    Profile,
    Level,
    RtspClientCount,
    UriParameters,
}

impl PropertyKey {
    pub const ALL: [Self; 21] = [
        Self::InputMode,
        Self::AudioBitrate,
        Self::VideoBitrate,
        Self::Framerate,
        Self::Width,
        Self::Height,
        Self::RtspState,
        Self::UpstreamState,
        Self::AutoBitrate,
        Self::SourceState,
        Self::HlsState,
        Self::GopLength,
        Self::GopOnSceneChange,
        Self::OpenGop,
        Self::BFrames,
        Self::PFrames,
        Self::Slices,
        Self::Profile,
        Self::Level,
        Self::RtspClientCount,
        Self::UriParameters,
    ];

    /// Property name on the bus.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InputMode => "inputMode",
            Self::AudioBitrate => "audioBitrate",
            Self::VideoBitrate => "videoBitrate",
            Self::Framerate => "framerate",
            Self::Width => "width",
            Self::Height => "height",
            Self::RtspState => "rtspState",
            Self::UpstreamState => "upstreamState",
            Self::AutoBitrate => "autoBitrate",
            Self::SourceState => "sourceState",
            Self::HlsState => "hlsState",
            Self::GopLength => "gopLength",
            Self::GopOnSceneChange => "gopOnSceneChange",
            Self::OpenGop => "openGop",
            Self::BFrames => "bFrames",
            Self::PFrames => "pFrames",
            Self::Slices => "slices",
            Self::Profile => "profile",
            Self::Level => "level",
            Self::RtspClientCount => "rtspClientCount",
            Self::UriParameters => "uriParameters",
        }
    }

    #[must_use]
    pub fn value_type(self) -> ValueType {
        match self {
            Self::AutoBitrate | Self::GopOnSceneChange | Self::OpenGop => ValueType::Bool,
            Self::UriParameters => ValueType::Str,
            _ => ValueType::Int32,
        }
    }

    /// Access advertised by the server.
    ///
    /// Informational only: the client sends writes to read-only keys and
    /// lets the server reject them.
    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::RtspState
            | Self::UpstreamState
            | Self::SourceState
            | Self::HlsState
            | Self::RtspClientCount
            | Self::UriParameters => Access::Read,
            _ => Access::ReadWrite,
        }
    }

    #[must_use]
    pub fn is_writable(self) -> bool {
        self.access() == Access::ReadWrite
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property '{0}'")]
pub struct UnknownProperty(pub String);

impl FromStr for PropertyKey {
    type Err = UnknownProperty;

    /// Accepts the bus name (`audioBitrate`) or a kebab/snake spelling
    /// (`audio-bitrate`, `audio_bitrate`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| UnknownProperty(s.to_string()))
    }
}

/// A property value as carried on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i32),
    Bool(bool),
    Str(String),
}

impl PropertyValue {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int32,
            Self::Bool(_) => ValueType::Bool,
            Self::Str(_) => ValueType::Str,
        }
    }

    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Parse user input into a value of the given type.
    ///
    /// Booleans accept `true/false`, `on/off`, `yes/no` and `1/0`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseValueError`] if `input` is not a valid literal for `ty`.
    pub fn parse(ty: ValueType, input: &str) -> Result<Self, ParseValueError> {
        let err = || ParseValueError {
            ty,
            input: input.to_string(),
        };
        match ty {
            ValueType::Int32 => input.trim().parse().map(Self::Int).map_err(|_| err()),
            ValueType::Bool => match input.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(Self::Bool(true)),
                "false" | "off" | "no" | "0" => Ok(Self::Bool(false)),
                _ => Err(err()),
            },
            ValueType::Str => Ok(Self::Str(input.to_string())),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not a valid {ty} value")]
pub struct ParseValueError {
    pub ty: ValueType,
    pub input: String,
}
