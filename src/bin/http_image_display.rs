//! Host runner for the link-triggered image display
//!
//! Watches reachability of the image server, publishes link transitions on
//! the event bus and renders into a headless panel. Each rendered frame can be
//! written to disk for inspection.
//!
//! Environment:
//!
//! - `IMAGE_HOST`, `IMAGE_PATH`: image location (defaults are compiled in)
//! - `IMAGE_TIMEOUT_MS`: request timeout
//! - `WIFI_SSID`, `WIFI_PASS`: logged only; the host OS owns the network
//! - `FRAME_OUTPUT`: file that receives every displayed frame
//! - `RUST_LOG`: log filter, `debug` by default

use std::env;
use std::fs;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use env_logger::Env;
use http_image_display::events::{EventBus, LINK_STATUS_CHANGED, SUBSCRIBER_NAME};
use http_image_display::{
    Builder, Config, CycleOutcome, DEFAULT_TIMEOUT_MS, Dimensions, LinkHandler, LinkStatus,
    MemoryPanel, ReqwestTransport,
};

const DEFAULT_HOST: &str = "74.82.197.217";
const DEFAULT_PATH: &str = "/image.bin";
const HTTP_PORT: u16 = 80;
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

fn config_from_env() -> Result<Config> {
    let host = env::var("IMAGE_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_owned());
    let path = env::var("IMAGE_PATH").unwrap_or_else(|_| DEFAULT_PATH.to_owned());
    let timeout_ms = match env::var("IMAGE_TIMEOUT_MS") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("IMAGE_TIMEOUT_MS is not a number: {raw}"))?,
        Err(_) => DEFAULT_TIMEOUT_MS,
    };

    let dims = Dimensions::new(
        http_image_display::config::PANEL_4IN26_WIDTH,
        http_image_display::config::PANEL_4IN26_HEIGHT,
    )?;
    let mut builder = Builder::new()
        .dimensions(dims)
        .host(&host)
        .path(&path)
        .timeout_ms(timeout_ms);
    if let Ok(ssid) = env::var("WIFI_SSID") {
        let password = env::var("WIFI_PASS").unwrap_or_default();
        builder = builder.credentials(&ssid, &password);
    }
    Ok(builder.build()?)
}

/// Reports the link as up while the image server accepts TCP connections
struct LinkMonitor {
    target: String,
    last: Option<LinkStatus>,
}

impl LinkMonitor {
    fn new(host: &str) -> Self {
        let target = if host.contains(':') {
            host.to_owned()
        } else {
            format!("{host}:{HTTP_PORT}")
        };
        Self { target, last: None }
    }

    fn probe(&self) -> LinkStatus {
        let addrs: Vec<SocketAddr> = match self.target.to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                log::trace!("Cannot resolve {}: {}", self.target, e);
                return LinkStatus::Down;
            }
        };
        let reachable = addrs
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, PROBE_TIMEOUT).is_ok());
        LinkStatus::from(reachable)
    }

    /// The new status if it differs from the last one reported
    fn poll(&mut self) -> Option<LinkStatus> {
        let status = self.probe();
        if self.last == Some(status) {
            return None;
        }
        self.last = Some(status);
        Some(status)
    }
}

fn run() -> Result<()> {
    log::info!("==========================================");
    log::info!("HTTP Image Display");
    log::info!("==========================================");

    let config = config_from_env()?;
    log::info!("Image URL: http://{}{}", config.host, config.path);
    if let Some(credentials) = &config.credentials {
        log::info!(
            "WiFi {} is managed by the host network stack",
            credentials.ssid
        );
    }

    let frame_output = env::var_os("FRAME_OUTPUT").map(PathBuf::from);
    let transport = ReqwestTransport::new().context("creating HTTP client")?;
    let panel = MemoryPanel::new(config.dimensions).with_realtime_delays();
    let mut monitor = LinkMonitor::new(&config.host);
    let mut handler = LinkHandler::new(config, transport, panel);

    let mut bus = EventBus::new();
    bus.subscribe(LINK_STATUS_CHANGED, SUBSCRIBER_NAME, move |status| {
        let outcome = handler.on_link_status(status)?;
        if let (CycleOutcome::Rendered(kind), Some(path)) = (outcome, &frame_output) {
            if let Some(frame) = handler.renderer().panel().frame() {
                match fs::write(path, frame) {
                    Ok(()) => log::info!("Wrote {:?} frame to {}", kind, path.display()),
                    Err(e) => log::warn!("Cannot write frame to {}: {}", path.display(), e),
                }
            }
        }
        Ok(())
    });

    log::info!("Waiting for network connection...");
    loop {
        if let Some(status) = monitor.poll() {
            log::debug!("Link status changed: {:?}", status);
            bus.publish(LINK_STATUS_CHANGED, status);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
