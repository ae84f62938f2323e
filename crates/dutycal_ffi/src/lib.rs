//! Flutter-facing FFI adapter over `dutycal_core`.

pub mod api;
