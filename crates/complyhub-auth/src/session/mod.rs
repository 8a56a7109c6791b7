//! Session token issuance and refresh.

pub mod issuer;

pub use issuer::SessionIssuer;
