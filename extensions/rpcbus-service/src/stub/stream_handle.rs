use rpcbus::message::Payload;

/// A live stream opened by a stub.
pub trait StreamHandle: Send {
    /// Ends or cancels the stream. Must not panic if the stream already
    /// finished on its own.
    fn close(&mut self);
}

/// A stream that accepts request messages.
pub trait WritableStream: StreamHandle {
    fn write(&mut self, message: Payload);

    /// Half-closes the request side.
    fn end_write(&mut self);
}
