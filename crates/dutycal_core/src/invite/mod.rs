//! Per-duty calendar invitations.
//!
//! # Responsibility
//! - Derive the invite window and reminder offset (`window`).
//! - Serialize the invite as an `.ics` document (`ics`).
//!
//! # See also
//! - `InvitePolicy::OVERNIGHT` for the shift hours in force.

pub mod ics;
pub mod window;
