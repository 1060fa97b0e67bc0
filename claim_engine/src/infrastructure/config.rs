use std::path::PathBuf;

use serde::Deserialize;

use claim_domain::ClaimError;

/// Application configuration, layered from a base TOML file plus
/// environment-variable overrides (`CLAIMPIPE_` prefix, `__` nesting
/// separator — e.g. `CLAIMPIPE_DATABASE__PATH`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
    pub mailbox: MailboxConfig,
    pub blob: BlobConfig,
    pub erp: ErpConfig,
    pub dirs: DirConfig,
    pub processing: ProcessingConfig,
    pub registries: RegistryConfig,
}

/// Static, operator-maintained reference data loaded once at startup
/// (spec.md §3, §4.1, §4.4): one directory per per-issuer family
/// (templates, rules, account maps) and one file each for the small
/// operational tables (keyword catalog, tax/keying/CS-routing tables).
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub templates_dir: PathBuf,
    pub rules_dir: PathBuf,
    pub account_maps_dir: PathBuf,
    pub keyword_catalog_file: PathBuf,
    pub ops_tables_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,
}

fn default_pool_size() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub base_url: String,
    pub access_token: String,
    #[serde(default = "default_ocr_retries")]
    pub retry_attempts: u32,
}

fn default_ocr_retries() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub shared_mailbox_smtp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    pub account: String,
    pub container: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErpSystemConfig {
    pub system_id: String,
    pub host: String,
    pub client: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    pub active_system_id: String,
    pub systems: Vec<ErpSystemConfig>,
}

impl ErpConfig {
    pub fn active(&self) -> Option<&ErpSystemConfig> {
        self.systems.iter().find(|s| s.system_id == self.active_system_id)
    }
}

/// Filesystem layout per claim (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
pub struct DirConfig {
    pub input: PathBuf,
    pub upload: PathBuf,
    pub done: PathBuf,
    pub failed: PathBuf,
    pub duplicate: PathBuf,
    pub template_err: PathBuf,
    pub archive: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Policy for picking among multiple YZ-type notifications for the same
    /// (invoice|delivery) (spec.md §9 open question): `first`, `last`, or
    /// `error`. Resolved by notification-id ordering, treated here as
    /// equivalent to chronological ordering — see DESIGN.md for the
    /// rationale. Defaults to `first`, matching
    /// [`DuplicatePolicy::First`](crate::infrastructure::services::erp_reconciler_service::DuplicatePolicy::First).
    #[serde(default = "default_duplicates_policy")]
    pub notification_duplicates_policy: String,
    #[serde(default = "default_lock_retry_attempts")]
    pub lock_retry_attempts: u32,
    #[serde(default = "default_lock_retry_backoff_secs")]
    pub lock_retry_backoff_secs: u64,
    /// Days a completed credit note's PDF sits in `done` before the
    /// archiver moves it to cold storage (spec.md §4.8's
    /// `completed → archived` transition).
    #[serde(default = "default_archive_retention_days")]
    pub archive_retention_days: i64,
    /// Port the Prometheus `/metrics` and `/health` endpoint binds to on
    /// `127.0.0.1`.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_duplicates_policy() -> String {
    "first".to_string()
}

fn default_lock_retry_attempts() -> u32 {
    20
}

fn default_lock_retry_backoff_secs() -> u64 {
    3
}

fn default_archive_retention_days() -> i64 {
    90
}

fn default_metrics_port() -> u16 {
    9090
}

impl AppConfig {
    /// Loads `base_path` (TOML) then applies `CLAIMPIPE_`-prefixed
    /// environment overrides.
    pub fn load(base_path: &str) -> Result<Self, ClaimError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(base_path))
            .add_source(
                config::Environment::with_prefix("CLAIMPIPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ClaimError::InvalidConfiguration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ClaimError::InvalidConfiguration(e.to_string()))
    }
}
