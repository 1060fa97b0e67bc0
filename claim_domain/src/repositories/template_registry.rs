use crate::entities::{AccountMap, ProcessingRule, Template};
use crate::error::ClaimError;
use crate::value_objects::{Category, TemplateId};

/// Loads and exposes extraction templates (spec.md §4.1). Implementations
/// load every template file under a known directory tree once at startup;
/// templates are immutable afterward.
pub trait TemplateRegistry: Send + Sync {
    /// Ordered candidate templates for `issuer`, in load order; the
    /// extraction engine tests each in turn and stops at first keyword match.
    fn candidates(&self, issuer: &str) -> Vec<&Template>;

    fn get(&self, template_id: &TemplateId) -> Option<&Template>;
}

/// Loads per-customer, per-template processing rules (spec.md §3, §6).
pub trait ProcessingRuleRegistry: Send + Sync {
    fn get(&self, template_id: &TemplateId, category: Option<Category>) -> Option<&ProcessingRule>;
}

/// Loads per-customer account maps (spec.md §4.4).
pub trait AccountMapRegistry: Send + Sync {
    fn get(&self, customer_country: &str) -> Option<&AccountMap>;
}

/// Marker so registries can report why a load failed with file context.
pub type LoadResult<T> = Result<T, ClaimError>;
