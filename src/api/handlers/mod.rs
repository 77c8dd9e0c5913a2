pub mod chat;
pub mod openai;
pub mod status;

use crate::orchestrate::EventSink;
use crate::stream::StreamEncoder;
use crate::types::{OrchestrationRequest, ProgressEvent};
use crate::AppState;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs a request in the background and relays its progress events as SSE
/// frames. The executing task owns the sink; the stream ends when `Done`
/// closes the channel. A pacing delay is applied between content chunks
/// only, never to progress lines.
pub fn sse_response(
    state: AppState,
    request: OrchestrationRequest,
    model: String,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let sink = EventSink::new(tx);
        // Errors already reach the client as encoded content.
        let _ = orchestrator.execute(&request, &sink).await;
    });

    let encoder = StreamEncoder::new(model);
    let delay = Duration::from_millis(state.config.stream.chunk_delay_ms);
    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            let done = matches!(event, ProgressEvent::Done);
            let pace = matches!(event, ProgressEvent::ContentChunk(_));
            for frame in encoder.encode(&event) {
                yield Ok(Event::default().data(frame));
            }
            if done {
                break;
            }
            if pace && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
