use std::fmt;

macro_rules! index_wrapper {
    ($struct:ident, $prefix:literal) => {
        #[doc = concat!("A numeric newtype identifying a ", stringify!($struct), ", displayed as `", $prefix, "<n>`")]
        #[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[repr(transparent)]
        pub struct $struct(pub u32);

        impl From<u32> for $struct {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $struct {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_wrapper!(BidderId, "b");
index_wrapper!(RegionId, "r");
index_wrapper!(ItemId, "i");

/// Bands are named rather than numbered (e.g. `"A"`, `"LOW_PAIRED"`).
#[derive(Debug, Hash, PartialEq, Eq, Clone, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct BandId(String);

impl BandId {
    /// The band name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BandId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for BandId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        assert_eq!(BidderId(3).to_string(), "b3");
        assert_eq!(RegionId(0).to_string(), "r0");
        assert_eq!(ItemId(12).to_string(), "i12");
        assert_eq!(BandId::from("LOW_PAIRED").to_string(), "LOW_PAIRED");
    }

    #[test]
    fn ids_are_transparent_in_json() {
        assert_eq!(serde_json::to_string(&RegionId(7)).unwrap(), "7");
        let band: BandId = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(band.as_str(), "A");
    }
}
