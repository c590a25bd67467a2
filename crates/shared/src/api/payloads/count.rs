use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// A whole number that the client may send either as a JSON number or as a
/// numeric string, form inputs tend to produce the latter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LenientCount(pub i64);

impl LenientCount {
    /// Negative values become 0 so validation reports them as too small
    pub fn to_count(self) -> u32 {
        u32::try_from(self.0.max(0)).unwrap_or(u32::MAX)
    }
}

impl From<u32> for LenientCount {
    fn from(value: u32) -> Self {
        Self(i64::from(value))
    }
}

impl<'de> Deserialize<'de> for LenientCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> de::Visitor<'de> for CountVisitor {
            type Value = LenientCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a whole number or a string containing one")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LenientCount(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LenientCount(i64::try_from(v).unwrap_or(i64::MAX)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.trim()
                    .parse::<i64>()
                    .map(LenientCount)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(serde_json::from_str::<LenientCount>("3").unwrap(), LenientCount(3));
        assert_eq!(serde_json::from_str::<LenientCount>("\" 12 \"").unwrap(), LenientCount(12));
        assert_eq!(serde_json::from_str::<LenientCount>("-2").unwrap().to_count(), 0);
    }

    #[test]
    fn rejects_everything_else() {
        assert!(serde_json::from_str::<LenientCount>("\"three\"").is_err());
        assert!(serde_json::from_str::<LenientCount>("2.5").is_err());
        assert!(serde_json::from_str::<LenientCount>("true").is_err());
    }
}
