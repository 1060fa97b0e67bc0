//! Thin presentation-facing surface: one [`PipelineCommand`] variant per
//! pipeline stage operation, and a [`Dispatcher`] that wires the
//! composition root (registries, adapters, domain services, use cases) from
//! [`AppConfig`](crate::infrastructure::config::AppConfig) and runs whichever
//! command it's given. `claim_bootstrap`'s CLI is the only caller.

use std::sync::Arc;
use std::time::Duration;

use claim_domain::error::ClaimError;
use claim_domain::repositories::{AccountMapRegistry, DocumentRepository, ProcessingRuleRegistry, TemplateRegistry};
use claim_domain::services::{CategorizationService, ClaimCompilerService, ErpReconcilerService, ExtractionService};

use crate::application::commands::{ArchiveCommand, CreateClaimCommand, DispatchCommand, DownloadCommand, ExtractCommand};
use crate::application::{ArchiveDocumentsUseCase, CreateClaimUseCase, DispatchDocumentsUseCase, DownloadDocumentsUseCase, ExtractDocumentUseCase};
use crate::infrastructure::adapters::{ErpSession, LocalBlobStore, ReqwestOcrClient, StubErpClient, StubMailboxClient};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::metrics::PipelineMetrics;
use crate::infrastructure::registry::{OpsTables, YamlAccountMapRegistry, YamlProcessingRuleRegistry, YamlTemplateRegistry};
use crate::infrastructure::repositories::schema::initialize_database;
use crate::infrastructure::repositories::sqlite_document_repository::SqliteDocumentRepository;
use crate::infrastructure::services::categorization_service::{DefaultCategorizationService, KeywordCatalog};
use crate::infrastructure::services::claim_compiler_service::DefaultClaimCompilerService;
use crate::infrastructure::services::erp_reconciler_service::DefaultErpReconcilerService;
use crate::infrastructure::services::extraction_service::DefaultExtractionService;
use crate::infrastructure::services::line_item_reconcilers::LineItemReconcilerRegistry;
use crate::infrastructure::services::numeric_parser::DefaultNumericParser;

/// One variant per operation a pipeline run can be asked to perform
/// (spec.md §2, §4.8). `claim_bootstrap`'s CLI maps its subcommands onto
/// these 1:1.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    Download { subfolder: String },
    Extract { record_id: i64, issuer: String, force_reextract: bool },
    CreateClaim { record_id: i64, applied_message_category: Option<String>, ignore_already_existing: bool },
    Dispatch { record_id: i64 },
    Archive { record_id: i64, archive_virtual_path: String },
}

impl PipelineCommand {
    fn stage_name(&self) -> &'static str {
        match self {
            PipelineCommand::Download { .. } => "download",
            PipelineCommand::Extract { .. } => "extract",
            PipelineCommand::CreateClaim { .. } => "create_claim",
            PipelineCommand::Dispatch { .. } => "dispatch",
            PipelineCommand::Archive { .. } => "archive",
        }
    }
}

/// Composition root: owns every concrete adapter/registry/service and the
/// use cases built from them. Built once per process from [`AppConfig`].
pub struct Dispatcher {
    download: DownloadDocumentsUseCase,
    extract: ExtractDocumentUseCase,
    create_claim: CreateClaimUseCase,
    dispatch: DispatchDocumentsUseCase,
    archive: ArchiveDocumentsUseCase,
    metrics: Arc<PipelineMetrics>,
}

impl Dispatcher {
    pub async fn build(config: &AppConfig) -> Result<Self, ClaimError> {
        let pool = initialize_database(&config.database.path.to_string_lossy())
            .await
            .map_err(ClaimError::Database)?;
        let repo: Arc<dyn DocumentRepository> = Arc::new(SqliteDocumentRepository::new(pool));

        let templates: Arc<dyn TemplateRegistry> = Arc::new(YamlTemplateRegistry::load(&config.registries.templates_dir)?);
        let rules: Arc<dyn ProcessingRuleRegistry> = Arc::new(YamlProcessingRuleRegistry::load(&config.registries.rules_dir)?);
        let accounts: Arc<dyn AccountMapRegistry> = Arc::new(YamlAccountMapRegistry::load(&config.registries.account_maps_dir)?);
        let keywords = KeywordCatalog::load(&config.registries.keyword_catalog_file)?;
        let ops = OpsTables::load(&config.registries.ops_tables_file)?;

        let ocr = Arc::new(ReqwestOcrClient::new(config.ocr.base_url.clone(), config.ocr.access_token.clone(), config.ocr.retry_attempts));
        let numeric = Arc::new(DefaultNumericParser);
        let line_items = Arc::new(LineItemReconcilerRegistry::new());

        let extraction: Arc<dyn ExtractionService> =
            Arc::new(DefaultExtractionService::new(ocr, templates.clone(), numeric, line_items, "default".to_string()));

        let categorizer: Arc<dyn CategorizationService> = Arc::new(DefaultCategorizationService::new(keywords));

        let erp_client: Arc<dyn crate::infrastructure::adapters::ErpClient> = Arc::new(StubErpClient);
        let compiler: Arc<dyn ClaimCompilerService> =
            Arc::new(DefaultClaimCompilerService::new(erp_client, ops.tax_code_table(), ops.account_keying.clone()));

        let session = Arc::new(ErpSession::new(
            Box::new(StubErpClient),
            config.processing.lock_retry_attempts,
            Duration::from_secs(config.processing.lock_retry_backoff_secs),
        ));
        let duplicates = config.processing.notification_duplicates_policy.parse()?;
        let reconciler: Arc<dyn ErpReconcilerService> = Arc::new(DefaultErpReconcilerService::new(
            session,
            duplicates,
            ops.cs_task_responsible.clone(),
            ops.category_priority.clone(),
        ));

        let mailbox = Arc::new(StubMailboxClient);
        let blob = Arc::new(LocalBlobStore::new(config.blob.container.clone().into()));

        Ok(Self {
            download: DownloadDocumentsUseCase::new(mailbox.clone(), repo.clone(), config.dirs.input.clone()),
            extract: ExtractDocumentUseCase::new(extraction, repo.clone()),
            create_claim: CreateClaimUseCase::new(templates, rules, accounts, categorizer, compiler, reconciler, repo.clone()),
            dispatch: DispatchDocumentsUseCase::new(mailbox, repo.clone()),
            archive: ArchiveDocumentsUseCase::new(blob, repo, chrono::Duration::days(config.processing.archive_retention_days)),
            metrics: Arc::new(PipelineMetrics::new()),
        })
    }

    /// Shared handle to the process's metrics registry, for the bootstrap
    /// binary to expose on the metrics endpoint.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    pub async fn run(&self, command: PipelineCommand) -> Result<(), ClaimError> {
        let stage = command.stage_name();
        let result = match command {
            PipelineCommand::Download { subfolder } => self
                .download
                .run(&DownloadCommand { subfolder })
                .await
                .map(|registered| tracing::info!(count = registered.len(), "download stage complete")),
            PipelineCommand::Extract { record_id, issuer, force_reextract } => {
                self.extract.run(&ExtractCommand { record_id, issuer, force_reextract }).await.map(|_| ())
            }
            PipelineCommand::CreateClaim { record_id, applied_message_category, ignore_already_existing } => self
                .create_claim
                .run(&CreateClaimCommand { record_id, applied_message_category, ignore_already_existing })
                .await
                .map(|outcome| tracing::info!(?outcome, "create-claim stage complete")),
            PipelineCommand::Dispatch { record_id } => self.dispatch.run(&DispatchCommand { record_id }).await.map(|_| ()),
            PipelineCommand::Archive { record_id, archive_virtual_path } => {
                self.archive.run(&ArchiveCommand { record_id, archive_virtual_path }).await.map(|_| ())
            }
        };
        let status = if result.is_ok() { "ok" } else { "error" };
        self.metrics.documents_processed.with_label_values(&[stage, status]).inc();
        result
    }
}

