/// Walks `subfolder` for new mailbox messages and registers any PDF the
/// dedup store hasn't already handled (spec.md §4.8's `received` state).
#[derive(Debug, Clone)]
pub struct DownloadCommand {
    pub subfolder: String,
}

/// Runs the Extraction Engine against a single registered document.
#[derive(Debug, Clone)]
pub struct ExtractCommand {
    pub record_id: i64,
    pub issuer: String,
    pub force_reextract: bool,
}

/// Categorizes (debit notes only), compiles, and reconciles a single
/// extracted document against the ERP.
#[derive(Debug, Clone)]
pub struct CreateClaimCommand {
    pub record_id: i64,
    pub applied_message_category: Option<String>,
    pub ignore_already_existing: bool,
}

/// Files the source email according to the document's terminal status for
/// this run (spec.md §4.8's `mail_*_moved` transitions).
#[derive(Debug, Clone)]
pub struct DispatchCommand {
    pub record_id: i64,
}

/// Moves a completed credit note's PDF to cold storage once its retention
/// window has elapsed (spec.md §4.8's `archived` transition).
#[derive(Debug, Clone)]
pub struct ArchiveCommand {
    pub record_id: i64,
    pub archive_virtual_path: String,
}
