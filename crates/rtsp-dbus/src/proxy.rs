//! Typed proxy for the control interface, in the server's wire types.
//!
//! [`ControlClient`](crate::ControlClient) drives the blocking variant;
//! member names are spelled out because the server uses camelCase.

#[zbus::proxy(
    interface = "com.dreambox.RTSPserver",
    default_service = "com.dreambox.RTSPserver",
    default_path = "/com/dreambox/RTSPserver"
)]
pub trait RtspServer {
    #[zbus(name = "enableHLS")]
    fn enable_hls(&self, state: bool, port: u32, user: &str, pw: &str) -> zbus::Result<bool>;

    #[zbus(name = "enableRTSP")]
    fn enable_rtsp(
        &self,
        state: bool,
        path: &str,
        port: u32,
        user: &str,
        pw: &str,
    ) -> zbus::Result<bool>;

    #[zbus(name = "enableUpstream")]
    fn enable_upstream(
        &self,
        state: bool,
        host: &str,
        aport: u32,
        vport: u32,
    ) -> zbus::Result<bool>;

    #[zbus(name = "setResolution")]
    fn set_resolution(&self, width: i32, height: i32) -> zbus::Result<()>;

    #[zbus(signal, name = "ping")]
    fn ping(&self) -> zbus::Result<()>;

    #[zbus(signal, name = "sourceStateChanged")]
    fn source_state_changed(&self, state: i32) -> zbus::Result<()>;

    #[zbus(signal, name = "hlsStateChanged")]
    fn hls_state_changed(&self, state: i32) -> zbus::Result<()>;

    #[zbus(signal, name = "upstreamStateChanged")]
    fn upstream_state_changed(&self, state: i32) -> zbus::Result<()>;

    /// Upstream bitrate in kbit/s.
    #[zbus(signal, name = "tcpBitrate")]
    fn tcp_bitrate(&self, kbps: i32) -> zbus::Result<()>;

    #[zbus(signal, name = "rtspClientCountChanged")]
    fn rtsp_client_count_changed(&self, count: i32, host: &str) -> zbus::Result<()>;

    #[zbus(signal, name = "uriParametersChanged")]
    fn uri_parameters_changed(&self, parameters: &str) -> zbus::Result<()>;

    #[zbus(signal, name = "rtspStateChanged")]
    fn rtsp_state_changed(&self, state: i32) -> zbus::Result<()>;

    #[zbus(signal, name = "encoderError")]
    fn encoder_error(&self) -> zbus::Result<()>;
}
