/// D-Bus service name of the streaming server.
///
/// The server registers its control interface under the same name.
pub const SERVICE_NAME: &str = "com.dreambox.RTSPserver";

/// D-Bus interface name of the control object.
pub const INTERFACE_NAME: &str = SERVICE_NAME;

/// D-Bus object path of the control object.
pub const OBJECT_PATH: &str = "/com/dreambox/RTSPserver";

/// Remote method names.
pub mod method {
    pub const ENABLE_HLS: &str = "enableHLS";
    pub const ENABLE_RTSP: &str = "enableRTSP";
    pub const ENABLE_UPSTREAM: &str = "enableUpstream";
    pub const SET_RESOLUTION: &str = "setResolution";
}

/// Remote signal names.
pub mod signal {
    pub const PING: &str = "ping";
    pub const SOURCE_STATE_CHANGED: &str = "sourceStateChanged";
    pub const HLS_STATE_CHANGED: &str = "hlsStateChanged";
    pub const UPSTREAM_STATE_CHANGED: &str = "upstreamStateChanged";
    pub const TCP_BITRATE: &str = "tcpBitrate";
    pub const RTSP_CLIENT_COUNT_CHANGED: &str = "rtspClientCountChanged";
    pub const URI_PARAMETERS_CHANGED: &str = "uriParametersChanged";
    pub const RTSP_STATE_CHANGED: &str = "rtspStateChanged";
    pub const ENCODER_ERROR: &str = "encoderError";
}
