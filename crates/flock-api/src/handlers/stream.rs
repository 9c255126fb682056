//! Server-Sent Events stream endpoint.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use flock_core::error::AppError;
use flock_core::types::ConnectionId;
use flock_realtime::StreamEngine;

use crate::extractors::SessionUser;
use crate::state::AppState;

/// Query parameters for the stream endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamParams {
    /// Client-supplied connection id. Tabs use distinct ids; a
    /// reconnecting client may reuse its previous one.
    pub connection_id: Option<ConnectionId>,
}

/// GET /api/notifications/stream
///
/// Opens the notification stream. The engine queues `connected` and
/// `initial_notifications` ahead of live traffic; every frame is one
/// JSON stream message in the SSE `data:` field. Heartbeats are
/// protocol messages from the engine, not SSE comments.
pub async fn notification_stream(
    State(state): State<AppState>,
    session: SessionUser,
    Query(params): Query<StreamParams>,
) -> Result<Sse<GuardedStream>, AppError> {
    let (conn_id, rx) = state.engine.connect(&session, params.connection_id).await?;

    Ok(Sse::new(GuardedStream {
        inner: ReceiverStream::new(rx),
        engine: state.engine.clone(),
        conn_id,
    }))
}

/// SSE event stream that unregisters its connection when dropped.
///
/// Axum drops the response body when the client goes away; without the
/// drop hook the connection entry would linger until its next failed
/// send or the lifetime deadline.
#[derive(Debug)]
pub struct GuardedStream {
    inner: ReceiverStream<String>,
    engine: Arc<StreamEngine>,
    conn_id: ConnectionId,
}

impl Stream for GuardedStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(frame)) => Poll::Ready(Some(Ok(Event::default().data(frame)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for GuardedStream {
    fn drop(&mut self) {
        debug!(conn_id = %self.conn_id, "Stream response dropped");
        self.engine.disconnect(&self.conn_id);
    }
}
