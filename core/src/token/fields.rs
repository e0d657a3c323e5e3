//! Request field extraction
//!
//! Decodes an inbound field map into a [`TokenRequest`]. Every field carries
//! its own presence flag, so a field that was not supplied never overwrites
//! the value already held by the request.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use super::types::TokenRequest;
use crate::error::{ApiError, Result};

/// Field set of a token request, `None` meaning "not supplied"
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TokenFields {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i64>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_scopes")]
    pub scopes: Option<Vec<String>>,

    #[serde(default, deserialize_with = "deserialize_expires_at")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_access_level")]
    pub access_level: Option<i64>,
}

impl TokenFields {
    /// Decode fields from a JSON object
    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(map))
            .map_err(|e| ApiError::invalid_request(format!("invalid token fields: {}", e)))
    }

    /// Decode fields from a raw JSON request body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        match serde_json::from_slice(body) {
            Ok(Value::Object(map)) => Self::from_map(map),
            Ok(_) => Err(ApiError::invalid_request("request body must be a JSON object")),
            Err(e) => Err(ApiError::invalid_request(format!("invalid JSON body: {}", e))),
        }
    }
}

impl TokenRequest {
    /// Build a request from scratch, leaving absent fields at their zero value
    pub fn from_fields(fields: TokenFields) -> Self {
        let mut request = Self::default();
        request.apply(fields);
        request
    }

    /// Overwrite only the fields that were supplied
    pub fn apply(&mut self, fields: TokenFields) {
        if let Some(id) = fields.id {
            self.resource_id = id;
        }
        if let Some(name) = fields.name {
            self.name = name;
        }
        if let Some(scopes) = fields.scopes {
            self.scopes = scopes;
        }
        if let Some(access_level) = fields.access_level {
            self.access_level = access_level;
        }
        if let Some(expires_at) = fields.expires_at {
            self.expires_at = Some(expires_at);
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntVisitor { field: "id" })
}

fn deserialize_access_level<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntVisitor {
        field: "access_level",
    })
}

/// Integer given as a JSON number or a numeric string
struct IntVisitor {
    field: &'static str,
}

impl<'de> Visitor<'de> for IntVisitor {
    type Value = Option<i64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an integer for '{}'", self.field)
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(value))
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(value)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }

    fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }
}

/// Deserialize scopes as either a comma-separated string or an array
fn deserialize_scopes<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScopesVisitor;

    impl<'de> Visitor<'de> for ScopesVisitor {
        type Value = Option<Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma-separated string or array of strings for 'scopes'")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(split_scopes(value.split(','))))
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut values: Vec<String> = Vec::new();
            while let Some(value) = seq.next_element::<String>()? {
                values.push(value);
            }
            Ok(Some(split_scopes(values.iter().map(String::as_str))))
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScopesVisitor)
}

fn split_scopes<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deserialize an expiry given as a date, an RFC 3339 timestamp, or Unix seconds
///
/// A bare date means midnight UTC on that date.
fn deserialize_expires_at<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ExpiresAtVisitor;

    impl<'de> Visitor<'de> for ExpiresAtVisitor {
        type Value = Option<DateTime<Utc>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a date, RFC 3339 timestamp, or Unix seconds for 'expires_at'")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            let value = value.trim();
            if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                return Ok(Some(date.and_time(NaiveTime::MIN).and_utc()));
            }
            DateTime::parse_from_rfc3339(value)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            DateTime::from_timestamp(value, 0)
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Signed(value), &self))
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ExpiresAtVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Result<TokenFields> {
        match value {
            Value::Object(map) => TokenFields::from_map(map),
            other => panic!("test input must be an object, got {}", other),
        }
    }

    #[test]
    fn test_only_id_present() {
        let request = TokenRequest::from_fields(fields(json!({"id": 7})).unwrap());

        assert_eq!(
            request,
            TokenRequest {
                resource_id: 7,
                ..TokenRequest::default()
            }
        );
    }

    #[test]
    fn test_all_fields_present() {
        let request = TokenRequest::from_fields(
            fields(json!({
                "id": 42,
                "name": "deploy",
                "scopes": ["read_api", "read_repository"],
                "access_level": 30,
                "expires_at": "2030-01-31",
            }))
            .unwrap(),
        );

        assert_eq!(request.resource_id, 42);
        assert_eq!(request.name, "deploy");
        assert_eq!(request.scopes, vec!["read_api", "read_repository"]);
        assert_eq!(request.access_level, 30);
        assert_eq!(
            request.expires_at,
            Some(Utc.with_ymd_and_hms(2030, 1, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_apply_keeps_fields_not_supplied() {
        let mut request = TokenRequest {
            resource_id: 1,
            name: "original".to_string(),
            scopes: vec!["api".to_string()],
            access_level: 40,
            expires_at: None,
        };

        request.apply(fields(json!({"name": "renamed"})).unwrap());

        assert_eq!(request.resource_id, 1);
        assert_eq!(request.name, "renamed");
        assert_eq!(request.scopes, vec!["api"]);
        assert_eq!(request.access_level, 40);
    }

    #[test]
    fn test_explicit_zero_is_distinct_from_absent() {
        let present = fields(json!({"access_level": 0, "name": ""})).unwrap();
        assert_eq!(present.access_level, Some(0));
        assert_eq!(present.name, Some(String::new()));

        let absent = fields(json!({})).unwrap();
        assert_eq!(absent, TokenFields::default());
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let fields = fields(json!({"id": null, "scopes": null, "expires_at": null})).unwrap();
        assert_eq!(fields, TokenFields::default());
    }

    #[test]
    fn test_scopes_from_comma_separated_string() {
        let fields = fields(json!({"scopes": "read_api, read_repository,,"})).unwrap();
        assert_eq!(
            fields.scopes,
            Some(vec!["read_api".to_string(), "read_repository".to_string()])
        );
    }

    #[test]
    fn test_empty_scopes_string_is_present_but_empty() {
        let fields = fields(json!({"scopes": ""})).unwrap();
        assert_eq!(fields.scopes, Some(vec![]));
    }

    #[test]
    fn test_integers_from_strings() {
        let fields = fields(json!({"id": "15", "access_level": " 20 "})).unwrap();
        assert_eq!(fields.id, Some(15));
        assert_eq!(fields.access_level, Some(20));
    }

    #[test]
    fn test_expires_at_formats() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 31, 0, 0, 0).unwrap();

        let from_date = fields(json!({"expires_at": "2030-01-31"})).unwrap();
        assert_eq!(from_date.expires_at, Some(expected));

        let from_rfc3339 = fields(json!({"expires_at": "2030-01-31T00:00:00Z"})).unwrap();
        assert_eq!(from_rfc3339.expires_at, Some(expected));

        let from_offset = fields(json!({"expires_at": "2030-01-31T02:00:00+02:00"})).unwrap();
        assert_eq!(from_offset.expires_at, Some(expected));

        let from_secs = fields(json!({"expires_at": expected.timestamp()})).unwrap();
        assert_eq!(from_secs.expires_at, Some(expected));
    }

    #[test]
    fn test_type_mismatch_is_a_decode_error() {
        let err = fields(json!({"id": "seven"})).unwrap_err();
        assert_eq!(err.error_key(), "invalid_request");
        assert!(err.to_string().contains("'id'"));

        let err = fields(json!({"access_level": 1.5})).unwrap_err();
        assert!(err.to_string().contains("'access_level'"));

        let err = fields(json!({"scopes": [1, 2]})).unwrap_err();
        assert!(err.to_string().contains("invalid token fields"));

        let err = fields(json!({"expires_at": "next tuesday"})).unwrap_err();
        assert!(err.to_string().contains("'expires_at'"));

        assert!(fields(json!({"name": 12})).is_err());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let fields = fields(json!({"id": 3, "description": "extra"})).unwrap();
        assert_eq!(fields.id, Some(3));
    }

    #[test]
    fn test_from_slice() {
        let fields = TokenFields::from_slice(br#"{"id": 9, "name": "bot"}"#).unwrap();
        assert_eq!(fields.id, Some(9));
        assert_eq!(fields.name.as_deref(), Some("bot"));

        let err = TokenFields::from_slice(b"[9, \"bot\"]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));

        let err = TokenFields::from_slice(b"{not json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON body"));
    }
}
