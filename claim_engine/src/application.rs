// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Application layer: one use case per pipeline stage operation (spec.md
//! §2's Downloader → Extractor → Creator → Dispatcher/Archiver), plus the
//! plain command structs the presentation layer builds from CLI args.

pub mod commands;
pub mod use_cases;

pub use commands::{ArchiveCommand, CreateClaimCommand, DispatchCommand, DownloadCommand, ExtractCommand};
pub use use_cases::archive_documents::ArchiveDocumentsUseCase;
pub use use_cases::create_claim::CreateClaimUseCase;
pub use use_cases::dispatch_documents::DispatchDocumentsUseCase;
pub use use_cases::download_documents::DownloadDocumentsUseCase;
pub use use_cases::extract_document::ExtractDocumentUseCase;
