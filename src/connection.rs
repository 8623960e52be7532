use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{FrameCodec, ProtocolError};
use crate::frame::Frame;

/// One client socket. Requests are decoded and replies encoded by a `FrameCodec`.
pub struct Connection {
    pub id: Uuid,
    framed: Framed<TcpStream, FrameCodec>,
}

impl Connection {
    pub fn with_codec(stream: TcpStream, codec: FrameCodec) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            framed: Framed::new(stream, codec),
        }
    }

    /// Next request from the client. `Ok(None)` once the peer has closed the socket.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        self.framed.next().await.transpose()
    }

    /// Sends one reply, flushed with a single write.
    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), ProtocolError> {
        self.framed.feed(frame).await?;
        self.framed.flush().await
    }
}
