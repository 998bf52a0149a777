//! External service clients for the MindFlow client.
//!
//! HTTP implementations of the remote store port (Supabase-style account and
//! record service) and the analysis port (Gemini).

pub mod cloud_store;
pub mod gemini;

pub use crate::cloud_store::CloudStoreClient;
pub use crate::gemini::GeminiAnalysisService;
