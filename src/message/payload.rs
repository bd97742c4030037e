/// Opaque structured payload exchanged with service stubs.
///
/// The bus never inspects a payload's schema; it only forwards it.
pub type Payload = serde_json::Value;

/// A payload known to be keyed-object-shaped (call arguments).
pub type PayloadObject = serde_json::Map<String, serde_json::Value>;
