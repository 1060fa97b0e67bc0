use std::collections::HashMap;
use std::path::Path;

use claim_domain::entities::ProcessingRule;
use claim_domain::error::ClaimError;
use claim_domain::repositories::ProcessingRuleRegistry;
use claim_domain::value_objects::{Category, TemplateId};

/// Keyed by `(template_id, category)`; `category = None` covers rules that
/// apply regardless of category (credit-note templates have none, spec.md
/// §6).
pub struct YamlProcessingRuleRegistry {
    rules: HashMap<(String, Option<Category>), ProcessingRule>,
}

impl YamlProcessingRuleRegistry {
    pub fn load(dir: &Path) -> Result<Self, ClaimError> {
        let mut rules = HashMap::new();

        for entry in walk_yaml_files(dir)? {
            let contents = std::fs::read_to_string(&entry)?;
            let rule: ProcessingRule =
                serde_yaml::from_str(&contents).map_err(|e| ClaimError::TemplateLoad {
                    path: entry.display().to_string(),
                    detail: e.to_string(),
                })?;

            if rule.category.is_empty() {
                let key = (rule.template_id.clone(), None);
                if rules.contains_key(&key) {
                    return Err(ClaimError::TemplateLoad {
                        path: entry.display().to_string(),
                        detail: format!("duplicate rule for template '{}'", rule.template_id),
                    });
                }
                rules.insert(key, rule);
            } else {
                for category in rule.category.clone() {
                    let key = (rule.template_id.clone(), Some(category));
                    if rules.contains_key(&key) {
                        return Err(ClaimError::TemplateLoad {
                            path: entry.display().to_string(),
                            detail: format!(
                                "duplicate rule for template '{}' category {category:?}",
                                rule.template_id
                            ),
                        });
                    }
                    rules.insert(key, rule.clone());
                }
            }
        }

        Ok(Self { rules })
    }
}

fn walk_yaml_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, ClaimError> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

impl ProcessingRuleRegistry for YamlProcessingRuleRegistry {
    fn get(&self, template_id: &TemplateId, category: Option<Category>) -> Option<&ProcessingRule> {
        let id = template_id.to_string();
        self.rules
            .get(&(id.clone(), category))
            .or_else(|| self.rules.get(&(id, None)))
    }
}
