//! Request extractors shared across handlers.
//!
//! - [`ValidatedJson`] -- Deserializes a JSON body and runs its `validator` rules.

mod validated_json;

pub use validated_json::ValidatedJson;
