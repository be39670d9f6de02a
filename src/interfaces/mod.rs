//! Interface adapters - inbound transports

pub mod http;
