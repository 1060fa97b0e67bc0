use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// ERP organizational unit. Closed set per spec.md §4.5's post-compile
/// invariant: `company_code ∈ {1001, 1072, 0074}`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CompanyCode(u16);

const ALLOWED: [u16; 3] = [1001, 1072, 74];

impl CompanyCode {
    pub fn new(code: u16) -> Result<Self, ClaimError> {
        if !ALLOWED.contains(&code) {
            return Err(ClaimError::InvalidClaimContext {
                detail: format!("company code {code} is not one of {ALLOWED:?}"),
            });
        }
        Ok(Self(code))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for CompanyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_codes() {
        assert!(CompanyCode::new(1001).is_ok());
        assert!(CompanyCode::new(1072).is_ok());
        assert!(CompanyCode::new(74).is_ok());
    }

    #[test]
    fn rejects_unknown_code() {
        assert!(CompanyCode::new(9999).is_err());
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(CompanyCode::new(74).unwrap().to_string(), "0074");
    }
}
