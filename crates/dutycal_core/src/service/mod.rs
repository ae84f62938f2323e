//! Core use-case services.
//!
//! # Responsibility
//! - `roster_service`: mutations over the roster store, each returning a
//!   fresh snapshot.
//! - `calendar_service`: month views and invite export over a snapshot.
//!
//! FFI and CLI layers call these instead of the repositories.

pub mod calendar_service;
pub mod roster_service;
