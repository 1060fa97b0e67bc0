use std::collections::HashMap;
use std::path::Path;

use claim_domain::entities::AccountMap;
use claim_domain::error::ClaimError;
use claim_domain::repositories::AccountMapRegistry;

/// Keyed by `"{customer}_{country_code}"` (spec.md §4.4), matching the
/// Python source's per-customer module naming (`obi_de`, `bahag_de`, ...).
pub struct YamlAccountMapRegistry {
    maps: HashMap<String, AccountMap>,
}

impl YamlAccountMapRegistry {
    pub fn load(dir: &Path) -> Result<Self, ClaimError> {
        let mut maps = HashMap::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            let map: AccountMap =
                serde_yaml::from_str(&contents).map_err(|e| ClaimError::TemplateLoad {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                })?;
            map.validate()?;

            let key = format!(
                "{}_{}",
                map.customer.to_ascii_uppercase(),
                map.country_code.to_ascii_uppercase()
            );
            if maps.contains_key(&key) {
                return Err(ClaimError::TemplateLoad {
                    path: path.display().to_string(),
                    detail: format!("duplicate account map for '{key}'"),
                });
            }
            maps.insert(key, map);
        }

        Ok(Self { maps })
    }
}

impl AccountMapRegistry for YamlAccountMapRegistry {
    fn get(&self, customer_country: &str) -> Option<&AccountMap> {
        self.maps.get(&customer_country.to_ascii_uppercase())
    }
}
