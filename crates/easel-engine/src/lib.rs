//! Orchestration engine for easel.
//!
//! This crate wires the storage, cache, and service layers into the
//! three pipeline operations: generate an image (fingerprint-keyed
//! cache in front, single-flight dedup around the paid call, judged
//! retries behind), describe a stored asset (optionally validating the
//! summary), and judge an asset against an expectation. A
//! [`CleanupSweeper`] reclaims expired and over-budget artifacts, and
//! [`EaselHandle`] packages the whole pipeline behind one facade for
//! embedders and the CLI.
//!
//! Judged retries never fail the call: an artifact that exhausts its
//! retry budget is returned (and cached) with its failing
//! [`ValidationRecord`](easel_utils::types::ValidationRecord) so the
//! caller can decide what a `fail` verdict means.

mod description;
mod generation;
mod handle;
mod judge;
mod retry;
mod sweeper;
mod tools;

pub use description::{
    DescribeOptions, DescriptionOrchestrator, DescriptionResult, ValidateOptions,
};
pub use generation::{GenerateOptions, GenerationOrchestrator, GenerationOutcome};
pub use handle::{
    CacheStatus, EaselHandle, ProviderInfo, ProviderStatus, StatusReport, StorageStatus,
};
pub use judge::{JudgeAdapter, JudgeSubject};
pub use retry::{AttemptState, RetryState};
pub use sweeper::{CleanupSweeper, SweepFailure, SweepReport};
pub use tools::{
    DescribeAssetInput, DescribeAssetOutput, GenerateImageInput, GenerateImageOutput,
    ValidateAssetInput, ValidateAssetOutput,
};
