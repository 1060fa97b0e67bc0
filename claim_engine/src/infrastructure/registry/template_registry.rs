use std::collections::HashMap;
use std::path::Path;

use claim_domain::entities::Template;
use claim_domain::error::ClaimError;
use claim_domain::repositories::TemplateRegistry;
use claim_domain::value_objects::TemplateId;

/// Loads every template file under `dir/<issuer>/*.yaml` once at startup
/// (spec.md §4.1). Templates are immutable afterward; `candidates` preserves
/// load order so the extraction engine's first-match-wins rule is
/// deterministic.
pub struct YamlTemplateRegistry {
    by_issuer: HashMap<String, Vec<Template>>,
    by_id: HashMap<TemplateId, Template>,
}

impl YamlTemplateRegistry {
    /// Reads and validates every `*.yaml` file under `dir`, recursing one
    /// level for issuer subdirectories. Fails on the first structural
    /// violation (spec.md §4.1's validation contract) or duplicate
    /// `template_id`.
    pub fn load(dir: &Path) -> Result<Self, ClaimError> {
        let mut by_issuer: HashMap<String, Vec<Template>> = HashMap::new();
        let mut by_id: HashMap<TemplateId, Template> = HashMap::new();

        for entry in walk_yaml_files(dir)? {
            let contents = std::fs::read_to_string(&entry)?;
            let template: Template =
                serde_yaml::from_str(&contents).map_err(|e| ClaimError::TemplateLoad {
                    path: entry.display().to_string(),
                    detail: e.to_string(),
                })?;
            template.validate()?;

            if by_id.contains_key(&template.template_id) {
                return Err(ClaimError::TemplateLoad {
                    path: entry.display().to_string(),
                    detail: format!("duplicate template_id '{}'", template.template_id),
                });
            }

            by_issuer
                .entry(template.issuer_upper())
                .or_default()
                .push(template.clone());
            by_id.insert(template.template_id.clone(), template);
        }

        Ok(Self { by_issuer, by_id })
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

impl TemplateRegistry for YamlTemplateRegistry {
    fn candidates(&self, issuer: &str) -> Vec<&Template> {
        self.by_issuer
            .get(&issuer.to_ascii_uppercase())
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    fn get(&self, template_id: &TemplateId) -> Option<&Template> {
        self.by_id.get(template_id)
    }
}
