//! services/api/src/web/publisher.rs
//!
//! The outbound half of the presentation contract: a small seam over the
//! WebSocket sender so the worker tasks can publish state without knowing
//! about the socket, and tests can capture what would have been sent.

use crate::web::protocol::ServerMessage;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::{stream::SplitSink, SinkExt};
use prompt_studio_core::ports::{PortError, PortResult};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Publishes server messages and binary payloads to the connected client.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, message: ServerMessage) -> PortResult<()>;
    async fn publish_binary(&self, data: Bytes) -> PortResult<()>;
}

/// The production publisher: serializes onto the shared WebSocket sink.
pub struct WsPublisher {
    sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

impl WsPublisher {
    pub fn new(sender: Arc<Mutex<SplitSink<WebSocket, Message>>>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl EventPublisher for WsPublisher {
    async fn publish(&self, message: ServerMessage) -> PortResult<()> {
        let json = serde_json::to_string(&message)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.sender
            .lock()
            .await
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| PortError::Unexpected("Failed to send message to client.".to_string()))
    }

    async fn publish_binary(&self, data: Bytes) -> PortResult<()> {
        self.sender
            .lock()
            .await
            .send(Message::Binary(data))
            .await
            .map_err(|_| PortError::Unexpected("Failed to send binary frame to client.".to_string()))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use tokio::sync::mpsc::UnboundedSender;

    /// What a test observed going out over the wire.
    #[derive(Debug)]
    pub enum Published {
        Message(ServerMessage),
        Binary(Bytes),
    }

    /// A publisher that records everything into an unbounded channel.
    pub struct ChannelPublisher {
        sender: UnboundedSender<Published>,
    }

    impl ChannelPublisher {
        pub fn new(sender: UnboundedSender<Published>) -> Self {
            Self { sender }
        }
    }

    #[async_trait]
    impl EventPublisher for ChannelPublisher {
        async fn publish(&self, message: ServerMessage) -> PortResult<()> {
            self.sender
                .send(Published::Message(message))
                .map_err(|e| PortError::Unexpected(e.to_string()))
        }

        async fn publish_binary(&self, data: Bytes) -> PortResult<()> {
            self.sender
                .send(Published::Binary(data))
                .map_err(|e| PortError::Unexpected(e.to_string()))
        }
    }
}
