//! Password hashing and strength estimation.

pub mod hasher;
pub mod strength;

pub use hasher::{HashCost, PasswordHasher, hash_cost};
pub use strength::{StrengthReport, estimate_strength};
