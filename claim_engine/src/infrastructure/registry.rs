pub mod account_map_registry;
pub mod ops_tables;
pub mod rule_registry;
pub mod template_registry;

pub use account_map_registry::YamlAccountMapRegistry;
pub use ops_tables::OpsTables;
pub use rule_registry::YamlProcessingRuleRegistry;
pub use template_registry::YamlTemplateRegistry;
