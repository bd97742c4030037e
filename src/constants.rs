/// Descriptor kind tag carried by invocable RPC methods.
///
/// Registries built from reflected service metadata label every entry with a
/// kind; only entries with this tag may be dispatched to a stub.
pub const RPC_METHOD_KIND: &str = "Service.RPCMethod";

/// Serialized `data` field used for stream events that carry no payload
/// (e.g. `end`).
pub const END_EVENT_DATA: &str = "null";
