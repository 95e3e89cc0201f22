//! In-memory devices and router helpers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use loopback_api::application::services::{
    CliLoopbackService, NetconfLoopbackService, SessionScope,
};
use loopback_api::domain::loopback::{InterfaceConfig, InterfaceId};
use loopback_api::domain::platform::DevicePlatform;
use loopback_api::domain::validation::LoopbackValidator;
use loopback_api::infrastructure::netconf::reply::parse_interfaces;
use loopback_api::infrastructure::netconf::rpc::{BASE_NS, IFMGR_CFG_NS, IPV4_IO_CFG_NS};
use loopback_api::infrastructure::netconf::{Datastore, RpcReply};
use loopback_api::infrastructure::observability::HealthChecker;
use loopback_api::infrastructure::traits::{
    CliConnector, CliSession, ManagedSession, NetconfConnector, NetconfSession,
};
use loopback_api::interfaces::http::{build_router, ApiConfig, AppState};
use loopback_api::shared::error::DeviceError;
use parking_lot::Mutex;
use quick_xml::escape::escape;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// CLI device
// ---------------------------------------------------------------------------

/// 一台只认识loopback相关命令的IOS-XR
#[derive(Default)]
pub struct CliRouterState {
    /// 运行配置：接口名 -> 子命令
    pub running: BTreeMap<String, Vec<String>>,
    /// 收到的全部命令
    pub commands: Vec<String>,
    pub closed_sessions: usize,
}

#[derive(Clone, Default)]
pub struct FakeCliDevice {
    pub state: Arc<Mutex<CliRouterState>>,
    pub connects: Arc<AtomicUsize>,
    pub refuse_connections: bool,
}

impl FakeCliDevice {
    pub fn unreachable() -> Self {
        Self {
            refuse_connections: true,
            ..Default::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().commands.clone()
    }
}

#[async_trait]
impl CliConnector for FakeCliDevice {
    async fn connect(&self) -> Result<Box<dyn CliSession>, DeviceError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connections {
            return Err(DeviceError::Transport(
                "connect to 10.10.20.48:22: connection refused".to_string(),
            ));
        }
        Ok(Box::new(FakeCliSession {
            state: self.state.clone(),
            in_config: false,
            current: None,
            pending: Vec::new(),
        }))
    }
}

enum PendingChange {
    Line(String, String),
    Remove(String),
}

struct FakeCliSession {
    state: Arc<Mutex<CliRouterState>>,
    in_config: bool,
    current: Option<String>,
    pending: Vec<PendingChange>,
}

impl FakeCliSession {
    fn commit(&mut self) -> String {
        let mut state = self.state.lock();
        let mut changed = false;
        for change in self.pending.drain(..) {
            match change {
                PendingChange::Line(interface, line) => {
                    let lines = state.running.entry(interface).or_default();
                    let key = line.split_whitespace().next().unwrap_or_default().to_string();
                    lines.retain(|l| !l.starts_with(&key));
                    lines.push(line);
                    changed = true;
                }
                PendingChange::Remove(interface) => {
                    changed |= state.running.remove(&interface).is_some();
                }
            }
        }
        if changed {
            String::new()
        } else {
            "% No configuration changes to commit.".to_string()
        }
    }

    fn show_interfaces(&self) -> String {
        let state = self.state.lock();
        let mut out = String::new();
        for (name, lines) in &state.running {
            out.push_str(&format!("{} is up, line protocol is up\n", name));
            for line in lines {
                if let Some(text) = line.strip_prefix("description ") {
                    out.push_str(&format!("  Description: {}\n", text));
                }
                if let Some(rest) = line.strip_prefix("ipv4 address ") {
                    let mut parts = rest.split_whitespace();
                    let address = parts.next().unwrap_or_default();
                    let mask: std::net::Ipv4Addr = parts.next().unwrap_or("0.0.0.0").parse().unwrap();
                    let prefix = u32::from(mask).count_ones();
                    out.push_str(&format!("  Internet address is {}/{}\n", address, prefix));
                }
            }
        }
        out
    }
}

#[async_trait]
impl ManagedSession for FakeCliSession {
    async fn close(&mut self) -> Result<(), DeviceError> {
        self.state.lock().closed_sessions += 1;
        Ok(())
    }
}

#[async_trait]
impl CliSession for FakeCliSession {
    async fn send_command(&mut self, command: &str) -> Result<String, DeviceError> {
        self.state.lock().commands.push(command.to_string());

        let output = match command {
            "terminal length 0" => String::new(),
            "show interfaces" if !self.in_config => self.show_interfaces(),
            "configure terminal" => {
                self.in_config = true;
                String::new()
            }
            "commit" if self.in_config => self.commit(),
            "end" | "abort" => {
                self.in_config = false;
                self.current = None;
                self.pending.clear();
                String::new()
            }
            _ if self.in_config => {
                if let Some(name) = command.strip_prefix("no interface ") {
                    self.pending.push(PendingChange::Remove(name.to_string()));
                    self.current = None;
                    String::new()
                } else if let Some(name) = command.strip_prefix("interface ") {
                    self.current = Some(name.to_string());
                    String::new()
                } else if let (Some(interface), true) = (
                    self.current.clone(),
                    command.starts_with("description ") || command.starts_with("ipv4 address "),
                ) {
                    self.pending.push(PendingChange::Line(interface, command.to_string()));
                    String::new()
                } else {
                    "              ^\n% Invalid input detected at '^' marker.".to_string()
                }
            }
            _ => "              ^\n% Invalid input detected at '^' marker.".to_string(),
        };
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// NETCONF device
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct NetconfRouterState {
    pub running: BTreeMap<u32, InterfaceConfig>,
    /// 收到的 `<config>` 与 `<filter>` 载荷
    pub payloads: Vec<String>,
    pub closed_sessions: usize,
}

#[derive(Clone, Default)]
pub struct FakeNetconfDevice {
    pub state: Arc<Mutex<NetconfRouterState>>,
    pub connects: Arc<AtomicUsize>,
    pub refuse_connections: bool,
}

impl FakeNetconfDevice {
    pub fn unreachable() -> Self {
        Self {
            refuse_connections: true,
            ..Default::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<String> {
        self.state.lock().payloads.clone()
    }
}

#[async_trait]
impl NetconfConnector for FakeNetconfDevice {
    async fn connect(&self) -> Result<Box<dyn NetconfSession>, DeviceError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connections {
            return Err(DeviceError::Transport(
                "connect to 10.10.20.48:830: connection refused".to_string(),
            ));
        }
        Ok(Box::new(FakeNetconfSession {
            state: self.state.clone(),
            next_message_id: 101,
        }))
    }
}

struct FakeNetconfSession {
    state: Arc<Mutex<NetconfRouterState>>,
    next_message_id: u64,
}

impl FakeNetconfSession {
    fn reply(&mut self, body: &str) -> Result<RpcReply, DeviceError> {
        let id = self.next_message_id;
        self.next_message_id += 1;
        RpcReply::parse(&format!(
            r#"<rpc-reply message-id="{}" xmlns="{}">{}</rpc-reply>"#,
            id, BASE_NS, body
        ))
    }
}

fn render_interface(config: &InterfaceConfig) -> String {
    let mut xml = format!("<interface><name>{}</name>", escape(config.name.as_str()));
    if let Some(description) = &config.description {
        xml.push_str(&format!("<description>{}</description>", escape(description.as_str())));
    }
    if let (Some(address), Some(netmask)) = (&config.address, &config.netmask) {
        xml.push_str(&format!(
            r#"<ipv4-network xmlns="{}"><addresses><primary><address>{}</address><netmask>{}</netmask></primary></addresses></ipv4-network>"#,
            IPV4_IO_CFG_NS, address, netmask
        ));
    }
    xml.push_str("</interface>");
    xml
}

#[async_trait]
impl ManagedSession for FakeNetconfSession {
    async fn close(&mut self) -> Result<(), DeviceError> {
        self.state.lock().closed_sessions += 1;
        Ok(())
    }
}

#[async_trait]
impl NetconfSession for FakeNetconfSession {
    async fn edit_config(&mut self, target: Datastore, config: &str) -> Result<RpcReply, DeviceError> {
        assert_eq!(target, Datastore::Running);
        let entries = parse_interfaces(config)?;

        let missing = {
            let mut state = self.state.lock();
            state.payloads.push(config.to_string());

            let mut missing = None;
            for entry in entries {
                let Some(id) = entry.config.id else { continue };
                if entry.delete {
                    if state.running.remove(&id).is_none() {
                        missing = Some(entry.config.name.clone());
                    }
                } else {
                    state.running.insert(id, entry.config);
                }
            }
            missing
        };

        match missing {
            Some(name) => self.reply(&format!(
                "<rpc-error><error-type>application</error-type><error-tag>data-missing</error-tag><error-severity>error</error-severity><error-message>{} does not exist</error-message></rpc-error>",
                name
            )),
            None => self.reply("<ok/>"),
        }
    }

    async fn get_config(&mut self, source: Datastore, filter: &str) -> Result<RpcReply, DeviceError> {
        assert_eq!(source, Datastore::Running);
        let wanted: Vec<u32> = parse_interfaces(filter)?
            .into_iter()
            .filter_map(|entry| entry.config.id)
            .collect();

        let body = {
            let mut state = self.state.lock();
            state.payloads.push(filter.to_string());
            let found: Vec<String> = state
                .running
                .iter()
                .filter(|(id, _)| wanted.contains(id))
                .map(|(_, config)| render_interface(config))
                .collect();
            if found.is_empty() {
                "<data/>".to_string()
            } else {
                format!(
                    r#"<data><interfaces xmlns="{}">{}</interfaces></data>"#,
                    IFMGR_CFG_NS,
                    found.concat()
                )
            }
        };
        self.reply(&body)
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub cli: FakeCliDevice,
    pub netconf: FakeNetconfDevice,
    pub health: Arc<HealthChecker>,
}

impl TestApp {
    pub fn new(dry_run: bool) -> Self {
        Self::with_devices(FakeCliDevice::default(), FakeNetconfDevice::default(), dry_run)
    }

    pub fn with_devices(cli: FakeCliDevice, netconf: FakeNetconfDevice, dry_run: bool) -> Self {
        let health = Arc::new(HealthChecker::new("test"));
        let scope = SessionScope::new(Duration::from_secs(5), health.clone());
        let validator = LoopbackValidator::new();

        let state = AppState::new(
            CliLoopbackService::new(
                Arc::new(cli.clone()),
                DevicePlatform::CiscoXr,
                validator.clone(),
                scope.clone(),
            ),
            NetconfLoopbackService::new(Arc::new(netconf.clone()), validator, scope),
        );
        let config = ApiConfig {
            dry_run,
            device: "10.10.20.48".to_string(),
        };

        Self {
            router: build_router(state, &config, health.clone()),
            cli,
            netconf,
            health,
        }
    }

    /// 发送请求，返回状态码与JSON响应体
    pub async fn call(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call("POST", uri, Some(&body.to_string())).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call("GET", uri, None).await
    }
}

pub fn loopback(id: u32) -> InterfaceId {
    InterfaceId::new(id).unwrap()
}
