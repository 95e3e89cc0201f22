/// Structured configuration transport (NETCONF over SSH)
///
/// - `codec`: RFC 6242 framing (`]]>]]>` and chunked)
/// - `rpc`: request builders, including the IOS-XR loopback payloads
/// - `reply`: structural parsing of `<rpc-reply>`, `<hello>`, and interface subtrees
/// - `session`: hello exchange, RPC round-trips, SSH connector

pub mod codec;
pub mod reply;
pub mod rpc;
pub mod session;

pub use codec::{Framing, NetconfCodec};
pub use reply::{parse_interfaces, InterfaceEntry, ReplyOutcome, RpcError, RpcReply};
pub use rpc::Datastore;
pub use session::{NetconfStream, SshNetconfConnector};
