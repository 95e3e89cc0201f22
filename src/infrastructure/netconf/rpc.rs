/// NETCONF RPC 报文构造
///
/// 所有取值都来自已校验的领域类型；自由文本（description）经过XML转义。

use crate::domain::loopback::{InterfaceId, LoopbackSpec};
use quick_xml::escape::escape;

pub const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
pub const CAPABILITY_BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";
pub const CAPABILITY_BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

/// IOS-XR 接口管理配置模型
pub const IFMGR_CFG_NS: &str = "http://cisco.com/ns/yang/Cisco-IOS-XR-ifmgr-cfg";
/// IOS-XR IPv4 地址配置模型
pub const IPV4_IO_CFG_NS: &str = "http://cisco.com/ns/yang/Cisco-IOS-XR-ipv4-io-cfg";

/// 配置数据存储；loopback操作直接写 running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datastore {
    Running,
}

impl Datastore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datastore::Running => "running",
        }
    }
}

/// 客户端hello，同时声明 base:1.0 与 base:1.1
pub fn hello() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><hello xmlns="{}"><capabilities><capability>{}</capability><capability>{}</capability></capabilities></hello>"#,
        BASE_NS, CAPABILITY_BASE_1_0, CAPABILITY_BASE_1_1
    )
}

/// 用 `<rpc>` 包裹操作
pub fn rpc(message_id: u64, operation: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rpc message-id="{}" xmlns="{}">{}</rpc>"#,
        message_id, BASE_NS, operation
    )
}

pub fn edit_config(target: Datastore, config: &str) -> String {
    format!(
        "<edit-config><target><{}/></target>{}</edit-config>",
        target.as_str(),
        config
    )
}

pub fn get_config(source: Datastore, filter: &str) -> String {
    format!(
        "<get-config><source><{}/></source>{}</get-config>",
        source.as_str(),
        filter
    )
}

pub fn close_session() -> String {
    "<close-session/>".to_string()
}

/// 创建/更新loopback的 `<config>` 载荷
pub fn loopback_config(spec: &LoopbackSpec) -> String {
    let name = spec.id.name();
    let description = spec
        .description
        .as_deref()
        .map(|text| format!("<description>{}</description>", escape(text)))
        .unwrap_or_default();

    format!(
        concat!(
            r#"<config xmlns:xc="{base}">"#,
            r#"<interfaces xmlns="{ifmgr}">"#,
            "<interface>",
            "<name>{name}</name>",
            "<interface-name>{name}</interface-name>",
            "{description}",
            "<interface-type>software-loopback</interface-type>",
            "<shutdown>false</shutdown>",
            r#"<ipv4-network xmlns="{ipv4}">"#,
            "<addresses><primary>",
            "<address>{address}</address>",
            "<netmask>{netmask}</netmask>",
            "</primary></addresses>",
            "</ipv4-network>",
            "</interface>",
            "</interfaces>",
            "</config>"
        ),
        base = BASE_NS,
        ifmgr = IFMGR_CFG_NS,
        ipv4 = IPV4_IO_CFG_NS,
        name = name,
        description = description,
        address = spec.ipv4.address,
        netmask = spec.ipv4.netmask(),
    )
}

/// 删除loopback的 `<config>` 载荷
pub fn loopback_delete(id: InterfaceId) -> String {
    format!(
        r#"<config xmlns:xc="{base}"><interfaces xmlns="{ifmgr}"><interface xc:operation="delete"><name>{name}</name></interface></interfaces></config>"#,
        base = BASE_NS,
        ifmgr = IFMGR_CFG_NS,
        name = id.name(),
    )
}

/// 只选取一个接口的子树过滤器
pub fn loopback_filter(id: InterfaceId) -> String {
    format!(
        r#"<filter type="subtree" xmlns="{base}"><interfaces xmlns="{ifmgr}"><interface><name>{name}</name></interface></interfaces></filter>"#,
        base = BASE_NS,
        ifmgr = IFMGR_CFG_NS,
        name = id.name(),
    )
}
