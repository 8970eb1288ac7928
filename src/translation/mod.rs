/*!
 * Translation pipeline stage.
 *
 * This module turns chunks into translated chunks using the provider
 * client. It is split into two submodules:
 *
 * - `core`: prompt construction and single-attempt translation calls
 * - `orchestrator`: bounded-concurrency dispatch, retry policy, and
 *   order restoration under partial failure
 */

pub use self::core::{TranslatedChunk, TranslationService};
pub use self::orchestrator::{
    ChunkFailure, Orchestrator, PartialFailureReport, TranslationOutcome,
};

pub mod core;
pub mod orchestrator;
