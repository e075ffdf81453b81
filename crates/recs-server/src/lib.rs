//! HTTP gateway for the hybrid recommendation service (used by the binary and tests).

pub mod gateway;
