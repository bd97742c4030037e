use rpcbus_service::stub::{StreamHandle, WritableStream};

/// The stream a controller holds open for a streaming call.
///
/// Write and end capabilities are decided by the variant, not by probing the
/// handle.
pub(crate) enum ActiveStream {
    ClientStreaming(Box<dyn WritableStream>),
    ServerStreaming(Box<dyn StreamHandle>),
    BidiStreaming(Box<dyn WritableStream>),
}

impl ActiveStream {
    pub(crate) fn is_writable(&self) -> bool {
        !matches!(self, ActiveStream::ServerStreaming(_))
    }

    pub(crate) fn as_writable(&mut self) -> Option<&mut Box<dyn WritableStream>> {
        match self {
            ActiveStream::ClientStreaming(stream) | ActiveStream::BidiStreaming(stream) => {
                Some(stream)
            }
            ActiveStream::ServerStreaming(_) => None,
        }
    }

    pub(crate) fn close(&mut self) {
        match self {
            ActiveStream::ClientStreaming(stream) | ActiveStream::BidiStreaming(stream) => {
                stream.close()
            }
            ActiveStream::ServerStreaming(stream) => stream.close(),
        }
    }
}
