/// NETCONF reply parsing
///
/// Replies are read structurally with quick-xml: `<ok/>`, `<data>`, and
/// `<rpc-error>` are recognised by element, never by substring search.

use crate::domain::loopback::{InterfaceConfig, InterfaceId};
use crate::shared::error::DeviceError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::reader::Reader;
use serde::Serialize;
use std::fmt;

/// 一条 `<rpc-error>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub error_type: Option<String>,
    pub error_tag: Option<String>,
    pub error_severity: Option<String>,
    pub error_path: Option<String>,
    pub error_message: Option<String>,
}

impl RpcError {
    fn is_warning(&self) -> bool {
        self.error_severity.as_deref() == Some("warning")
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.error_tag.as_deref().unwrap_or("rpc-error");
        match &self.error_message {
            Some(message) => write!(f, "{}: {}", tag, message),
            None => f.write_str(tag),
        }
    }
}

/// reply的语义结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// `<ok/>`
    Ok,
    /// `<data>` 的内部子树（原始XML文本）
    Data(String),
    /// 至少一条严重级别为error的 `<rpc-error>`
    Errors(Vec<RpcError>),
    /// 空reply
    Empty,
}

/// 解析后的 `<rpc-reply>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    pub message_id: Option<String>,
    pub outcome: ReplyOutcome,
    raw: String,
}

impl RpcReply {
    pub fn parse(raw: &str) -> Result<Self, DeviceError> {
        let mut reader = Reader::from_str(raw);
        reader.config_mut().trim_text(true);

        let mut saw_root = false;
        let mut saw_ok = false;
        let mut message_id = None;
        let mut data = None;
        let mut errors = Vec::new();
        let mut current_error: Option<RpcError> = None;
        let mut current_field: Option<Vec<u8>> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"rpc-reply" => {
                        saw_root = true;
                        message_id = attribute(&e, b"message-id")?;
                    }
                    b"rpc-error" => current_error = Some(RpcError::default()),
                    b"data" if current_error.is_none() => {
                        let end = e.name().as_ref().to_vec();
                        let inner = reader.read_text(QName(&end)).map_err(malformed)?;
                        data = Some(inner.trim().to_string());
                    }
                    other if current_error.is_some() => current_field = Some(other.to_vec()),
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"rpc-reply" => {
                        saw_root = true;
                        message_id = attribute(&e, b"message-id")?;
                    }
                    b"ok" if current_error.is_none() => saw_ok = true,
                    b"data" if current_error.is_none() => data = Some(String::new()),
                    _ => {}
                },
                Event::Text(t) => {
                    if let (Some(error), Some(field)) = (current_error.as_mut(), current_field.as_deref()) {
                        let text = t.unescape().map_err(malformed)?.trim().to_string();
                        match field {
                            b"error-type" => error.error_type = Some(text),
                            b"error-tag" => error.error_tag = Some(text),
                            b"error-severity" => error.error_severity = Some(text),
                            b"error-path" => error.error_path = Some(text),
                            b"error-message" => error.error_message = Some(text),
                            _ => {}
                        }
                    }
                }
                Event::End(e) => {
                    current_field = None;
                    if e.local_name().as_ref() == b"rpc-error" {
                        if let Some(error) = current_error.take() {
                            errors.push(error);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(DeviceError::Transport(
                "device reply is not an <rpc-reply>".to_string(),
            ));
        }

        let outcome = if errors.iter().any(|e| !e.is_warning()) {
            ReplyOutcome::Errors(errors)
        } else if let Some(data) = data {
            ReplyOutcome::Data(data)
        } else if saw_ok {
            ReplyOutcome::Ok
        } else {
            ReplyOutcome::Empty
        };

        Ok(Self {
            message_id,
            outcome,
            raw: raw.to_string(),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::Ok)
    }

    pub fn data(&self) -> Option<&str> {
        match &self.outcome {
            ReplyOutcome::Data(data) => Some(data),
            _ => None,
        }
    }

    /// `<rpc-error>` 转为 `DeviceRejected`
    pub fn into_result(self) -> Result<Self, DeviceError> {
        match &self.outcome {
            ReplyOutcome::Errors(errors) => {
                let message = errors
                    .iter()
                    .filter(|e| !e.is_warning())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(DeviceError::rejected(message, Some(self.raw)))
            }
            _ => Ok(self),
        }
    }

    /// edit-config 只有 `<ok/>` 才算成功
    pub fn expect_ok(self) -> Result<Self, DeviceError> {
        let reply = self.into_result()?;
        if reply.is_ok() {
            Ok(reply)
        } else {
            Err(DeviceError::rejected("reply did not contain <ok/>", Some(reply.raw)))
        }
    }
}

/// 服务端 `<hello>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerHello {
    pub session_id: Option<u64>,
    pub capabilities: Vec<String>,
}

impl ServerHello {
    pub fn parse(raw: &str) -> Result<Self, DeviceError> {
        let mut reader = Reader::from_str(raw);
        reader.config_mut().trim_text(true);

        let mut hello = ServerHello::default();
        let mut saw_root = false;
        let mut current: Option<Vec<u8>> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if name == b"hello" {
                        saw_root = true;
                    }
                    current = Some(name);
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(malformed)?.trim().to_string();
                    match current.as_deref() {
                        Some(b"capability") => hello.capabilities.push(text),
                        Some(b"session-id") => hello.session_id = text.parse().ok(),
                        _ => {}
                    }
                }
                Event::End(_) => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(DeviceError::Transport(
                "device did not send a NETCONF <hello>".to_string(),
            ));
        }
        Ok(hello)
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// 配置载荷或 `<data>` 中的一个接口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEntry {
    pub config: InterfaceConfig,
    /// 带有 `operation="delete"` 或 `"remove"`
    pub delete: bool,
}

/// Reads every `interfaces/interface` element of a config or data subtree.
pub fn parse_interfaces(xml: &str) -> Result<Vec<InterfaceEntry>, DeviceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut entries = Vec::new();
    let mut current: Option<InterfaceEntry> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"interface" && last_is(&stack, b"interfaces") {
                    let operation = attribute(&e, b"operation")?;
                    current = Some(InterfaceEntry {
                        config: InterfaceConfig::default(),
                        delete: matches!(operation.as_deref(), Some("delete") | Some("remove")),
                    });
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    if e.local_name().as_ref() == b"shutdown" {
                        entry.config.shutdown = true;
                    }
                }
            }
            Event::Text(t) => {
                let Some(entry) = current.as_mut() else { continue };
                let text = t.unescape().map_err(malformed)?.trim().to_string();
                let in_primary = stack.iter().any(|n| n == b"primary");
                match stack.last().map(Vec::as_slice) {
                    Some(b"name") => set_name(&mut entry.config, text),
                    Some(b"interface-name") if entry.config.name.is_empty() => {
                        set_name(&mut entry.config, text)
                    }
                    Some(b"description") => entry.config.description = Some(text),
                    Some(b"interface-type") => entry.config.interface_type = Some(text),
                    Some(b"shutdown") => entry.config.shutdown = text == "true",
                    Some(b"address") if in_primary => entry.config.address = Some(text),
                    Some(b"netmask") if in_primary => entry.config.set_netmask(text),
                    _ => {}
                }
            }
            Event::End(_) => {
                let name = stack.pop();
                if name.as_deref() == Some(b"interface".as_slice()) && last_is(&stack, b"interfaces") {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn set_name(config: &mut InterfaceConfig, name: String) {
    config.id = InterfaceId::parse(&name).ok().map(|id| id.number());
    config.name = name;
}

fn last_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().map(Vec::as_slice) == Some(name)
}

fn attribute(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, DeviceError> {
    for attr in element.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.local_name().as_ref() == local {
            let value = attr.unescape_value().map_err(malformed)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn malformed(err: impl fmt::Display) -> DeviceError {
    DeviceError::Transport(format!("malformed NETCONF XML: {}", err))
}
