//! Exchange module - CLOB REST boundary and wire types

pub mod messages;
pub mod rest;

pub use rest::ClobRestClient;
