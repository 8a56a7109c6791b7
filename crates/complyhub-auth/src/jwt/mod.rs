//! Signed session tokens: claims, keys, encoding, and validation.

pub mod claims;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod keys;

pub use claims::{Claims, TokenType};
pub use codec::{TokenCodec, TokenSettings};
pub use decoder::JwtDecoder;
pub use encoder::{JwtEncoder, TokenPair};
pub use keys::TokenKeys;
