use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// An 11-character template identity, normalized upper-case at load time
/// (spec.md §3, §4.1). Globally unique across a registry.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn parse(raw: &str) -> Result<Self, ClaimError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.len() != 11 {
            return Err(ClaimError::TemplateLoad {
                path: String::new(),
                detail: format!(
                    "template_id '{raw}' must be exactly 11 characters, got {}",
                    normalized.len()
                ),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_upper_case() {
        let id = TemplateId::parse("obi_de_0001").unwrap();
        assert_eq!(id.as_str(), "OBI_DE_0001");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(TemplateId::parse("short").is_err());
    }
}
