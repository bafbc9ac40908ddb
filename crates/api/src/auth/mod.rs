//! Session-token support at the auth-collaborator boundary.
//!
//! Identity itself is established by an external auth provider; this
//! service only signs and validates the HS256 session tokens that gate
//! its HTTP surface.

pub mod jwt;
