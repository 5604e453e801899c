//! Protobuf message types, service traits and RPC metadata.

pub mod gitaly;
pub mod registry;
