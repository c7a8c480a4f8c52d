//! Schema message definitions for the mesh packet codec.
//!
//! These are the protobuf messages exchanged by mesh nodes and bridge
//! gateways, declared with `prost` derives so that no code generation step
//! is needed at build time. Only the messages the codec reads or writes are
//! present, and only the fields it surfaces; unknown fields are skipped on
//! decode as usual for protobuf.
//!
//! Application messages additionally derive `serde` traits following the
//! protobuf JSON mapping (see [`mapping`]), which is how the codec turns a
//! typed message into a generic field-name to value mapping and back.

#![warn(missing_docs)]
#![warn(clippy::all)]

#[macro_use]
mod macros;

pub mod mapping;
pub mod mesh;
pub mod mqtt;
pub mod portnums;
pub mod storeforward;
pub mod telemetry;

pub use mesh::{Data, HardwareModel, MeshPacket, Position, RouteDiscovery, Role, User};
pub use mqtt::ServiceEnvelope;
pub use portnums::PortNum;
pub use storeforward::StoreAndForward;
pub use telemetry::Telemetry;
