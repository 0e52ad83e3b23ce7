//! Defines the session token stored in the auth cookie and how to serialize/deserialize it.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::user::UserID;

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the token timestamps, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A session token that proves which user signed in and until when.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    /// When the token was issued or last renewed.
    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub issued_at: OffsetDateTime,

    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` issued at `now` that lasts for `duration`.
    pub fn new(user_id: UserID, now: OffsetDateTime, duration: Duration) -> Self {
        Self {
            user_id,
            issued_at: now,
            expires_at: now + duration,
        }
    }

    /// Whether the token is no longer valid at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// Whether the token was issued at least `update_age` before `now`.
    pub fn is_due_for_renewal(&self, now: OffsetDateTime, update_age: Duration) -> bool {
        now - self.issued_at >= update_age
    }
}

#[cfg(test)]
mod token_tests {
    use time::{Duration, UtcOffset, macros::datetime};

    use crate::{UserID, auth::token::Token};

    #[test]
    fn serialise_token() {
        let issued_at = datetime!(2025-12-14 03:54:00).assume_offset(UtcOffset::UTC);
        let token = Token::new(UserID::new(1), issued_at, Duration::days(7));
        let expected = r#"{"user_id":1,"issued_at":"2025-12-14 03:54:00.0 +00:00:00","expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#;

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let issued_at = datetime!(2025-12-14 00:00:00).assume_offset(UtcOffset::UTC);
        let expected = Token::new(UserID::new(1), issued_at, Duration::days(7));
        let token_string = r#"{"user_id":1,"issued_at":"2025-12-14 00:00:00.0 +00:00:00","expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let actual: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn expires_at_end_of_duration() {
        let now = datetime!(2025-06-01 12:00:00).assume_offset(UtcOffset::UTC);
        let token = Token::new(UserID::new(1), now, Duration::days(7));

        assert!(!token.is_expired(now + Duration::days(6)));
        assert!(token.is_expired(now + Duration::days(7)));
    }

    #[test]
    fn renewal_is_due_after_update_age() {
        let now = datetime!(2025-06-01 12:00:00).assume_offset(UtcOffset::UTC);
        let token = Token::new(UserID::new(1), now, Duration::days(7));

        assert!(!token.is_due_for_renewal(now + Duration::hours(23), Duration::days(1)));
        assert!(token.is_due_for_renewal(now + Duration::days(1), Duration::days(1)));
    }
}
