use rpcbus::constants::RPC_METHOD_KIND;
use std::fmt;

/// The kind tag attached to every registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// An invocable RPC method.
    RpcMethod,
    Service,
    Message,
    Enum,
    /// Any tag this crate does not recognize.
    Other(String),
}

impl DescriptorKind {
    /// Maps a reflected kind tag (e.g. `"Service.RPCMethod"`) to a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            RPC_METHOD_KIND => DescriptorKind::RpcMethod,
            "Service" => DescriptorKind::Service,
            "Message" => DescriptorKind::Message,
            "Enum" => DescriptorKind::Enum,
            other => DescriptorKind::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            DescriptorKind::RpcMethod => RPC_METHOD_KIND,
            DescriptorKind::Service => "Service",
            DescriptorKind::Message => "Message",
            DescriptorKind::Enum => "Enum",
            DescriptorKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// The four invocation patterns, keyed by the request/response stream flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MethodShape {
    Unary,
    ClientStreaming,
    ServerStreaming,
    BidiStreaming,
}

impl MethodShape {
    pub fn from_flags(request_stream: bool, response_stream: bool) -> Self {
        match (request_stream, response_stream) {
            (false, false) => MethodShape::Unary,
            (true, false) => MethodShape::ClientStreaming,
            (false, true) => MethodShape::ServerStreaming,
            (true, true) => MethodShape::BidiStreaming,
        }
    }

    pub fn request_stream(self) -> bool {
        matches!(self, MethodShape::ClientStreaming | MethodShape::BidiStreaming)
    }

    pub fn response_stream(self) -> bool {
        matches!(self, MethodShape::ServerStreaming | MethodShape::BidiStreaming)
    }
}

impl fmt::Display for MethodShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MethodShape::Unary => "unary",
            MethodShape::ClientStreaming => "client-streaming",
            MethodShape::ServerStreaming => "server-streaming",
            MethodShape::BidiStreaming => "bidi-streaming",
        };
        f.write_str(label)
    }
}

/// Registry metadata describing one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name as known to the stub provider.
    pub name: String,
    pub request_stream: bool,
    pub response_stream: bool,
    /// Human-readable name of the request message type.
    pub request_name: String,
    pub kind: DescriptorKind,
}

impl MethodDescriptor {
    /// Builds an RPC-method descriptor with the given streaming shape.
    pub fn rpc(name: impl Into<String>, request_name: impl Into<String>, shape: MethodShape) -> Self {
        Self {
            name: name.into(),
            request_stream: shape.request_stream(),
            response_stream: shape.response_stream(),
            request_name: request_name.into(),
            kind: DescriptorKind::RpcMethod,
        }
    }

    pub fn with_kind(mut self, kind: DescriptorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn shape(&self) -> MethodShape {
        MethodShape::from_flags(self.request_stream, self.response_stream)
    }

    pub fn is_rpc_method(&self) -> bool {
        self.kind == DescriptorKind::RpcMethod
    }
}
