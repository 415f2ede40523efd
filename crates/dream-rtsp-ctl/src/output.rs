//! Human and JSON rendering of property values and signals.

use rtsp_dbus::{
    HlsState, InputMode, PropertyKey, PropertyValue, RemoteCallError, RtspState, ServiceSignal,
    SourceState, UpstreamState,
};

/// Name of a state value, for keys that carry one of the known enums.
pub fn describe(key: PropertyKey, value: &PropertyValue) -> Option<String> {
    let raw = value.as_i32()?;
    let name = match key {
        PropertyKey::InputMode => InputMode::try_from(raw).ok()?.to_string(),
        PropertyKey::RtspState => RtspState::try_from(raw).ok()?.to_string(),
        PropertyKey::HlsState => HlsState::try_from(raw).ok()?.to_string(),
        PropertyKey::UpstreamState => UpstreamState::try_from(raw).ok()?.to_string(),
        PropertyKey::SourceState => SourceState::try_from(raw).ok()?.to_string(),
        _ => return None,
    };
    Some(name)
}

pub fn format_value(key: PropertyKey, value: &PropertyValue) -> String {
    match describe(key, value) {
        Some(name) => format!("{value} ({name})"),
        None => value.to_string(),
    }
}

/// One `status` line per key; failed reads are shown in place.
pub fn status_lines(
    results: &[(PropertyKey, Result<PropertyValue, RemoteCallError>)],
) -> Vec<String> {
    let width = results
        .iter()
        .map(|(key, _)| key.name().len())
        .max()
        .unwrap_or(0);
    results
        .iter()
        .map(|(key, result)| {
            let shown = match result {
                Ok(value) => format_value(*key, value),
                Err(err) => format!("<{err}>"),
            };
            format!("{:width$}  {shown}", key.name())
        })
        .collect()
}

/// `status --json`: readable values under their bus names, failures under `errors`.
pub fn status_json(
    results: &[(PropertyKey, Result<PropertyValue, RemoteCallError>)],
) -> serde_json::Value {
    let mut values = serde_json::Map::new();
    let mut errors = serde_json::Map::new();
    for (key, result) in results {
        match result {
            Ok(value) => {
                values.insert(key.name().to_string(), serde_json::json!(value));
            }
            Err(err) => {
                errors.insert(key.name().to_string(), err.to_string().into());
            }
        }
    }
    if !errors.is_empty() {
        values.insert("errors".to_string(), errors.into());
    }
    values.into()
}

pub fn format_signal(signal: &ServiceSignal) -> String {
    let state = |raw: i32, name: Option<String>| match name {
        Some(name) => format!("{raw} ({name})"),
        None => raw.to_string(),
    };
    match signal {
        ServiceSignal::Ping => "ping".to_string(),
        ServiceSignal::EncoderError => "encoderError".to_string(),
        ServiceSignal::SourceStateChanged(v) => format!(
            "sourceStateChanged {}",
            state(*v, SourceState::try_from(*v).ok().map(|s| s.to_string()))
        ),
        ServiceSignal::HlsStateChanged(v) => format!(
            "hlsStateChanged {}",
            state(*v, HlsState::try_from(*v).ok().map(|s| s.to_string()))
        ),
        ServiceSignal::UpstreamStateChanged(v) => format!(
            "upstreamStateChanged {}",
            state(*v, UpstreamState::try_from(*v).ok().map(|s| s.to_string()))
        ),
        ServiceSignal::RtspStateChanged(v) => format!(
            "rtspStateChanged {}",
            state(*v, RtspState::try_from(*v).ok().map(|s| s.to_string()))
        ),
        ServiceSignal::TcpBitrate(kbps) => format!("tcpBitrate {kbps} kbit/s"),
        ServiceSignal::RtspClientCountChanged { count, host } => {
            format!("rtspClientCountChanged {count} ({host})")
        }
        ServiceSignal::UriParametersChanged(params) => format!("uriParametersChanged {params}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_named() {
        assert_eq!(
            format_value(PropertyKey::RtspState, &PropertyValue::Int(2)),
            "2 (Running)"
        );
        assert_eq!(
            format_value(PropertyKey::InputMode, &PropertyValue::Int(1)),
            "1 (HDMI In)"
        );
        assert_eq!(
            format_value(PropertyKey::UpstreamState, &PropertyValue::Int(7)),
            "7"
        );
        assert_eq!(
            format_value(PropertyKey::VideoBitrate, &PropertyValue::Int(2)),
            "2"
        );
    }

    #[test]
    fn status_json_separates_errors() {
        let results = vec![
            (PropertyKey::Framerate, Ok(PropertyValue::Int(25))),
            (PropertyKey::AutoBitrate, Ok(PropertyValue::Bool(true))),
            (PropertyKey::UpstreamState, Err(RemoteCallError::NotConnected)),
        ];
        let json = status_json(&results);
        assert_eq!(json["framerate"], 25);
        assert_eq!(json["autoBitrate"], true);
        assert_eq!(
            json["errors"]["upstreamState"],
            "not connected to the streaming server"
        );
    }

    #[test]
    fn status_lines_align_names() {
        let results = vec![
            (PropertyKey::Width, Ok(PropertyValue::Int(1920))),
            (PropertyKey::UriParameters, Ok(PropertyValue::Str("?a=1".into()))),
        ];
        let lines = status_lines(&results);
        assert_eq!(lines[0], "width          1920");
        assert_eq!(lines[1], "uriParameters  ?a=1");
    }

    #[test]
    fn signals_are_readable() {
        assert_eq!(
            format_signal(&ServiceSignal::UpstreamStateChanged(4)),
            "upstreamStateChanged 4 (Overload)"
        );
        assert_eq!(
            format_signal(&ServiceSignal::RtspClientCountChanged {
                count: 2,
                host: "10.0.0.7".into()
            }),
            "rtspClientCountChanged 2 (10.0.0.7)"
        );
    }
}
