use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories answered from the points-of-interest table.
pub const CATALOGUED: [&str; 3] = ["place", "hotel", "restaurant"];

/// A label from the classifier's vocabulary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn general() -> Self {
        Self::new("general")
    }

    pub fn is_general(&self) -> bool {
        self.0 == "general"
    }

    pub fn is_catalogued(&self) -> bool {
        CATALOGUED.contains(&self.0.as_str())
    }

    /// Display plural; appends `s` unconditionally.
    pub fn plural(&self) -> String {
        format!("{}s", self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogued_categories() {
        assert!(Category::new("hotel").is_catalogued());
        assert!(!Category::new("shopping").is_catalogued());
        assert!(!Category::general().is_catalogued());
    }

    #[test]
    fn plural_is_naive() {
        assert_eq!(Category::new("hotel").plural(), "hotels");
        assert_eq!(Category::new("person").plural(), "persons");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Category::new("place")).unwrap();
        assert_eq!(json, "\"place\"");
    }
}
