//! Serde helpers for flexible deserialization.
//!
//! When the `tracing` feature is enabled, this module also logs warnings for any
//! unknown fields encountered while decoding API responses, helping detect API changes.

#[cfg(feature = "orders")]
use {serde::de::DeserializeOwned, serde_json::Value};

/// A `serde_as` type that accepts either epoch milliseconds or an RFC 3339 string
/// and yields a UTC [`DateTime`](chrono::DateTime).
///
/// The event bus stamps events with RFC 3339 strings while other producers send epoch
/// millisecond integers; both must decode to the same value.
/// Numeric strings are read as epoch milliseconds. Serialization always writes RFC 3339.
#[cfg(feature = "events")]
pub struct TimestampFromAny;

#[cfg(feature = "events")]
impl<'de> serde_with::DeserializeAs<'de, chrono::DateTime<chrono::Utc>> for TimestampFromAny {
    fn deserialize_as<D>(deserializer: D) -> Result<chrono::DateTime<chrono::Utc>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::fmt;

        use chrono::{DateTime, Utc};
        use serde::de::{self, Visitor};

        struct TimestampVisitor;

        fn from_millis<E: de::Error>(millis: i64) -> Result<DateTime<Utc>, E> {
            DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| E::custom(format!("timestamp {millis} is out of range")))
        }

        impl Visitor<'_> for TimestampVisitor {
            type Value = DateTime<Utc>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("epoch milliseconds or an RFC 3339 timestamp")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                from_millis(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let millis = i64::try_from(v)
                    .map_err(|_e| E::custom(format!("timestamp {v} is out of range")))?;
                from_millis(millis)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if let Ok(millis) = v.parse::<i64>() {
                    return from_millis(millis);
                }

                DateTime::parse_from_rfc3339(v)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| E::custom(format!("invalid timestamp {v:?}: {e}")))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

#[cfg(feature = "events")]
impl serde_with::SerializeAs<chrono::DateTime<chrono::Utc>> for TimestampFromAny {
    fn serialize_as<S>(
        source: &chrono::DateTime<chrono::Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&source.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}

/// Deserialize an API response, logging unknown fields and the path of any failure.
///
/// Unknown fields never fail deserialization; they only produce a `WARN` event.
#[cfg(all(feature = "tracing", feature = "orders"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(type_name = %type_name::<T>(), json = %value, "deserializing JSON");

    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        let json = original.to_string();
        let de = &mut serde_json::Deserializer::from_str(&json);
        let path_result: Result<T, _> = serde_path_to_error::deserialize(de);
        if let Err(path_err) = path_result {
            let path = path_err.path().to_string();
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path,
                value = %describe(value_at(&original, &path)),
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            value = %describe(value_at(&original, &path)),
            "unknown field in API response"
        );
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(all(not(feature = "tracing"), feature = "orders"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Resolve a `serde_ignored`/`serde_path_to_error` path (`a.b[0].c`, `?` for options)
/// against a JSON value.
#[cfg(all(feature = "tracing", feature = "orders"))]
fn value_at<'value>(root: &'value Value, path: &str) -> Option<&'value Value> {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
}

#[cfg(all(feature = "tracing", feature = "orders"))]
fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "<unable to retrieve>".to_owned(), Value::to_string)
}
