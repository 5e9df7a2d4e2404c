//! Claim sets embedded in session tokens.

use jiff::{Span, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role discriminant embedded in every token as the `"use"` claim.
///
/// The claim is mandatory: tokens without it (including any minted before the
/// discriminant existed) fail deserialization and are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Short-lived credential presented on every request.
    Access,
    /// Longer-lived credential exchanged for a fresh pair.
    Refresh,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject id of the authenticated user.
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    /// Granted scope strings captured at issuance.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Always [`TokenUse::Access`].
    #[serde(rename = "use")]
    pub token_use: TokenUse,
    /// Issuance time.
    #[serde(rename = "iat", with = "unix_seconds")]
    pub issued_at: Timestamp,
    /// Expiration time.
    #[serde(rename = "exp", with = "unix_seconds")]
    pub expires_at: Timestamp,
}

impl AccessClaims {
    /// Creates claims for a subject with the given scopes and lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error when `now + ttl` overflows the representable range.
    pub fn new(subject_id: Uuid, scopes: Vec<String>, ttl: Span) -> Result<Self, jiff::Error> {
        // Whole-second precision, matching the NumericDate wire form, so a
        // decoded token compares equal to the claims it was issued from.
        let issued_at = Timestamp::from_second(Timestamp::now().as_second())?;
        Ok(Self {
            subject_id,
            scopes,
            token_use: TokenUse::Access,
            issued_at,
            expires_at: issued_at.checked_add(ttl)?,
        })
    }

    /// Returns `true` once the expiration time has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }
}

/// Claims carried by a refresh token.
///
/// Deliberately scope-free: scopes are re-read from the user directory at
/// refresh time so revocations take effect without waiting out the refresh
/// window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject id of the authenticated user.
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    /// Always [`TokenUse::Refresh`].
    #[serde(rename = "use")]
    pub token_use: TokenUse,
    /// Issuance time.
    #[serde(rename = "iat", with = "unix_seconds")]
    pub issued_at: Timestamp,
    /// Expiration time.
    #[serde(rename = "exp", with = "unix_seconds")]
    pub expires_at: Timestamp,
}

impl RefreshClaims {
    /// Creates claims for a subject with the given lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error when `now + ttl` overflows the representable range.
    pub fn new(subject_id: Uuid, ttl: Span) -> Result<Self, jiff::Error> {
        // Whole-second precision, see [`AccessClaims::new`].
        let issued_at = Timestamp::from_second(Timestamp::now().as_second())?;
        Ok(Self {
            subject_id,
            token_use: TokenUse::Refresh,
            issued_at,
            expires_at: issued_at.checked_add(ttl)?,
        })
    }

    /// Returns `true` once the expiration time has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }
}

/// Serializes [`Timestamp`]s as integral unix seconds.
///
/// RFC 7519 requires `iat` and `exp` to be NumericDate values, and the
/// decoder's expiry validation reads `exp` as a number.
mod unix_seconds {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(timestamp.as_second())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        Timestamp::from_second(seconds).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan as _;
    use serde_json::json;

    use super::*;

    #[test]
    fn access_claims_serialize_to_registered_names() -> anyhow::Result<()> {
        let subject_id = Uuid::new_v4();
        let claims = AccessClaims::new(subject_id, vec!["gallery_create".into()], 30.minutes())?;
        let value = serde_json::to_value(&claims)?;

        assert_eq!(value["sub"], json!(subject_id.to_string()));
        assert_eq!(value["use"], json!("access"));
        assert_eq!(value["scopes"], json!(["gallery_create"]));
        assert!(value["iat"].is_i64());
        assert!(value["exp"].is_i64());
        assert!(value["exp"].as_i64() > value["iat"].as_i64());
        Ok(())
    }

    #[test]
    fn refresh_claims_carry_no_scopes() -> anyhow::Result<()> {
        let claims = RefreshClaims::new(Uuid::new_v4(), (5 * 24 * 60).minutes())?;
        let value = serde_json::to_value(&claims)?;

        assert_eq!(value["use"], json!("refresh"));
        assert!(value.get("scopes").is_none());
        Ok(())
    }

    #[test]
    fn claims_survive_serialization_unchanged() -> anyhow::Result<()> {
        let claims = AccessClaims::new(Uuid::new_v4(), vec!["gallery_create".into()], 30.minutes())?;
        let decoded: AccessClaims = serde_json::from_value(serde_json::to_value(&claims)?)?;
        assert_eq!(decoded, claims);

        let refresh = RefreshClaims::new(Uuid::new_v4(), (5 * 24 * 60).minutes())?;
        let decoded: RefreshClaims = serde_json::from_value(serde_json::to_value(&refresh)?)?;
        assert_eq!(decoded, refresh);
        Ok(())
    }

    #[test]
    fn missing_use_claim_fails_deserialization() {
        let value = json!({
            "sub": Uuid::new_v4().to_string(),
            "iat": 1_700_000_000,
            "exp": 1_700_001_800,
        });
        assert!(serde_json::from_value::<AccessClaims>(value).is_err());
    }

    #[test]
    fn expiry_is_checked_against_the_clock() -> anyhow::Result<()> {
        let fresh = AccessClaims::new(Uuid::new_v4(), Vec::new(), 30.minutes())?;
        assert!(!fresh.is_expired());

        let mut stale = fresh.clone();
        stale.expires_at = Timestamp::now().checked_sub(1.minutes())?;
        assert!(stale.is_expired());
        Ok(())
    }
}
