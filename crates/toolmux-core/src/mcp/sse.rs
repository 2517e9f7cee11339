//! Legacy SSE transport
//!
//! The server keeps a `text/event-stream` open. Its first `endpoint` event
//! names a URL (usually relative) that the client POSTs JSON-RPC messages
//! to; replies arrive on the stream as `message` events. rmcp accepts the
//! resulting sink/stream pair as a transport.

use std::pin::Pin;
use std::sync::Arc;

use futures::{sink, stream, Sink, Stream, StreamExt};
use reqwest::Url;
use reqwest_eventsource::{Event, EventSource};
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};

use super::error::{McpError, McpResult};
use crate::logging::Logger;

const ENDPOINT_EVENT: &str = "endpoint";
const MESSAGE_EVENT: &str = "message";

/// Outbound half: POSTs each client message to the announced endpoint
pub type SseSink = Pin<Box<dyn Sink<ClientJsonRpcMessage, Error = McpError> + Send>>;

/// Inbound half: server messages decoded from `message` events
pub type SseStream = Pin<Box<dyn Stream<Item = ServerJsonRpcMessage> + Send>>;

/// Open the event stream and wait for the POST endpoint
pub async fn open(sse_url: &Url, logger: Arc<dyn Logger>) -> McpResult<(SseSink, SseStream)> {
    let http = reqwest::Client::new();
    let mut events = EventSource::new(http.get(sse_url.clone()))
        .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

    let endpoint = wait_for_endpoint(&mut events, sse_url).await?;
    logger.debug(&format!("[SseTransport] Posting messages to {}", endpoint));

    Ok((outbound(http, endpoint), inbound(events, logger)))
}

async fn wait_for_endpoint(events: &mut EventSource, sse_url: &Url) -> McpResult<Url> {
    while let Some(event) = events.next().await {
        match event {
            Ok(Event::Open) => continue,
            Ok(Event::Message(msg)) if msg.event == ENDPOINT_EVENT => {
                return sse_url.join(msg.data.trim()).map_err(|e| {
                    events.close();
                    McpError::Protocol(format!("invalid endpoint '{}': {}", msg.data, e))
                });
            }
            Ok(Event::Message(_)) => continue,
            Err(e) => {
                events.close();
                return Err(McpError::ConnectionFailed(e.to_string()));
            }
        }
    }
    Err(McpError::ConnectionFailed(
        "event stream closed before an endpoint was announced".to_string(),
    ))
}

fn outbound(http: reqwest::Client, endpoint: Url) -> SseSink {
    Box::pin(sink::unfold(
        (http, endpoint),
        |(http, endpoint), message: ClientJsonRpcMessage| async move {
            http.post(endpoint.clone())
                .json(&message)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;
            Ok::<_, McpError>((http, endpoint))
        },
    ))
}

fn inbound(events: EventSource, logger: Arc<dyn Logger>) -> SseStream {
    Box::pin(stream::unfold(Some(events), move |state| {
        let logger = Arc::clone(&logger);
        async move {
            let mut events = state?;
            loop {
                match events.next().await {
                    Some(Ok(Event::Message(msg))) if msg.event == MESSAGE_EVENT => {
                        match serde_json::from_str::<ServerJsonRpcMessage>(&msg.data) {
                            Ok(message) => return Some((message, Some(events))),
                            Err(e) => logger.warn(&format!(
                                "[SseTransport] Dropping undecodable message: {}",
                                e
                            )),
                        }
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        // A reconnected stream would belong to a new session
                        logger.warn(&format!("[SseTransport] Event stream ended: {}", e));
                        events.close();
                        return None;
                    }
                    None => return None,
                }
            }
        }
    }))
}
