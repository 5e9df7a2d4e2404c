//! Session token minting, signing and verification.
//!
//! Tokens are compact JWS strings signed with a symmetric HS256 key. Access
//! tokens carry the subject id and its granted scopes; refresh tokens carry
//! only the subject id and exist solely to mint a fresh pair. The two kinds
//! are never interchangeable: each embeds a `"use"` claim naming its role and
//! the codec rejects a token presented for the other role.

mod claims;
mod codec;
mod issuer;

pub use self::claims::{AccessClaims, RefreshClaims, TokenUse};
pub use self::codec::{SessionKeys, TokenCodec};
pub use self::issuer::{TokenIssuer, TokenPair};
