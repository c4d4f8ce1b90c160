//! API surfaces

pub mod http;
