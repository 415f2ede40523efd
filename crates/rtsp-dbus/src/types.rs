use std::fmt;
use std::str::FromStr;

/// A state value returned by the server that has no matching variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: i32,
}

/// Generates the `i32` conversions for a wire enumeration.
///
/// The server exchanges these enums as plain `int32`; the client never
/// rejects an out-of-range value on the wire path, so `TryFrom` is only
/// used for display.
macro_rules! wire_enum {
    ($ty:ident, $kind:literal { $($variant:ident = $value:literal),+ $(,)? }) => {
        impl From<$ty> for i32 {
            fn from(value: $ty) -> Self {
                value as i32
            }
        }

        impl TryFrom<i32> for $ty {
            type Error = UnknownValue;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(UnknownValue { kind: $kind, value }),
                }
            }
        }
    };
}

/// Source selected by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum InputMode {
    /// Live TV picture.
    Live = 0,
    /// HDMI input.
    HdmiIn = 1,
    /// Background (no picture).
    Background = 2,
}

wire_enum!(InputMode, "input mode" { Live = 0, HdmiIn = 1, Background = 2 });

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "Live"),
            Self::HdmiIn => write!(f, "HDMI In"),
            Self::Background => write!(f, "Background"),
        }
    }
}

/// Lifecycle of the HLS server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum HlsState {
    Disabled = 0,
    Idle = 1,
    Running = 2,
}

wire_enum!(HlsState, "HLS state" { Disabled = 0, Idle = 1, Running = 2 });

impl fmt::Display for HlsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Lifecycle of the RTSP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RtspState {
    Disabled = 0,
    Idle = 1,
    Running = 2,
}

wire_enum!(RtspState, "RTSP state" { Disabled = 0, Idle = 1, Running = 2 });

impl fmt::Display for RtspState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Lifecycle of the TCP upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum UpstreamState {
    Disabled = 0,
    Connecting = 1,
    /// Connected, waiting for the mediator to request data.
    Waiting = 2,
    Transmitting = 3,
    /// The send queue overran; bitrate is being reduced.
    Overload = 4,
    /// Bitrate adjustment in progress after an overload.
    Adjusting = 5,
    Failed = 9,
}

wire_enum!(UpstreamState, "upstream state" {
    Disabled = 0,
    Connecting = 1,
    Waiting = 2,
    Transmitting = 3,
    Overload = 4,
    Adjusting = 5,
    Failed = 9,
});

impl fmt::Display for UpstreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Transmitting => write!(f, "Transmitting"),
            Self::Overload => write!(f, "Overload"),
            Self::Adjusting => write!(f, "Adjusting"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// State of the server's source pipeline (a `GstState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SourceState {
    VoidPending = 0,
    Null = 1,
    Ready = 2,
    Paused = 3,
    Playing = 4,
}

wire_enum!(SourceState, "source state" {
    VoidPending = 0,
    Null = 1,
    Ready = 2,
    Paused = 3,
    Playing = 4,
});

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VoidPending => write!(f, "Void pending"),
            Self::Null => write!(f, "Null"),
            Self::Ready => write!(f, "Ready"),
            Self::Paused => write!(f, "Paused"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

/// Framerates the encoder is known to accept. Not enforced.
pub mod framerate {
    pub const FPS_25: i32 = 25;
    pub const FPS_30: i32 = 30;
    pub const FPS_50: i32 = 50;
    pub const FPS_60: i32 = 60;

    pub const ALL: [i32; 4] = [FPS_25, FPS_30, FPS_50, FPS_60];
}

/// Encoder output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

impl Resolution {
    pub const RES_1080: Self = Self::new(1920, 1080);
    pub const RES_720: Self = Self::new(1280, 720);
    pub const RES_PAL: Self = Self::new(720, 576);

    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl From<(i32, i32)> for Resolution {
    fn from((width, height): (i32, i32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resolution '{0}', expected WIDTHxHEIGHT, 1080, 720 or pal")]
pub struct ParseResolutionError(String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "1080" | "1080p" => return Ok(Self::RES_1080),
            "720" | "720p" => return Ok(Self::RES_720),
            "pal" | "576" | "576p" => return Ok(Self::RES_PAL),
            _ => {}
        }

        let err = || ParseResolutionError(s.to_string());
        let (w, h) = trimmed
            .split_once(['x', 'X'])
            .ok_or_else(err)?;
        let width = w.trim().parse().map_err(|_| err())?;
        let height = h.trim().parse().map_err(|_| err())?;
        Ok(Self::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_values_match_wire_integers() {
        assert_eq!(i32::from(InputMode::Background), 2);
        assert_eq!(i32::from(RtspState::Running), 2);
        assert_eq!(i32::from(HlsState::Idle), 1);
        assert_eq!(i32::from(UpstreamState::Overload), 4);
        assert_eq!(i32::from(UpstreamState::Failed), 9);
        assert_eq!(i32::from(SourceState::Playing), 4);
    }

    #[test]
    fn unknown_state_is_reported_not_clamped() {
        assert_eq!(UpstreamState::try_from(3), Ok(UpstreamState::Transmitting));
        let err = UpstreamState::try_from(7).unwrap_err();
        assert_eq!(err.value, 7);
        assert_eq!(err.to_string(), "unknown upstream state value 7");
        assert!(InputMode::try_from(-1).is_err());
    }

    #[test]
    fn parse_resolution() {
        assert_eq!("1920x1080".parse(), Ok(Resolution::RES_1080));
        assert_eq!("1280 X 720".parse(), Ok(Resolution::RES_720));
        assert_eq!("pal".parse(), Ok(Resolution::RES_PAL));
        assert_eq!("720".parse(), Ok(Resolution::RES_720));
        assert!("1920".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
    }

    #[test]
    fn resolution_display() {
        assert_eq!(Resolution::RES_PAL.to_string(), "720x576");
    }
}
