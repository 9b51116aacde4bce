pub mod commitment;
pub mod opportunity;
pub mod record;

/// A loosely structured source row: string/number fields keyed by header
/// name. Both input sequences arrive in this shape.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
