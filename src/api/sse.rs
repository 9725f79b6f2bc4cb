//! Server-sent event replies
//!
//! Webhook responses stream back as SSE: one frame per RTVI event, then a
//! bare `close` data frame. The close frame is how the pipeline knows the
//! function call has finished, so it must always be last.

use super::rtvi::RtviEvent;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

/// Finite event stream answering one dispatched webhook.
pub fn directive_stream(
    events: Vec<RtviEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(futures::stream::iter(event_frames(events).into_iter().map(Ok)))
}

fn event_frames(events: Vec<RtviEvent>) -> Vec<Event> {
    let mut frames: Vec<Event> = events
        .into_iter()
        .map(|event| Event::default().event(event.label).data(event.payload.to_string()))
        .collect();
    frames.push(Event::default().data("close"));
    frames
}
