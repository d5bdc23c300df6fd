use crate::config::Config;
use crate::constants::{GEMINI_MODEL, SYSTEM_INSTRUCTION};
use crate::errors::{ConciergeError, ConciergeResult};
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// One unit of progress from the remote stream. The reader emits zero or
/// more fragments followed by exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Fragment(String),
    Done,
    Error(String),
}

/// A chat context bound to a fixed system instruction and model identifier.
/// History accumulates user/model turns so the model sees the whole exchange.
#[derive(Debug)]
pub struct ChatSession {
    client: Client,
    api_key: String,
    endpoint: String,
    history: Vec<Value>,
}

impl ChatSession {
    pub fn new(config: &Config) -> ConciergeResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ConciergeError::config_error(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            config.api_base.trim_end_matches('/'),
            GEMINI_MODEL
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
            history: Vec::new(),
        })
    }

    /// Sends one user message and returns a receiver of [`StreamEvent`]s.
    ///
    /// The user turn is recorded in history up front; the caller records the
    /// model turn via [`record_reply`](Self::record_reply) once the stream
    /// finishes, or drops it via [`discard_last_turn`](Self::discard_last_turn)
    /// on failure.
    pub async fn send_message_stream(
        &mut self,
        user_input: &str,
    ) -> ConciergeResult<mpsc::UnboundedReceiver<StreamEvent>> {
        self.history.push(json!({
            "role": "user",
            "parts": [{ "text": user_input }]
        }));

        let payload = json!({
            "contents": self.history,
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ConciergeError::network_error(format!("request failed: {}", e))
                } else {
                    ConciergeError::api_error(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConciergeError::api_error(api_error_message(status, &body)));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string()));
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Process complete SSE lines, keep the partial tail buffered
                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    let Some(data) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim_start();
                    if data.is_empty() {
                        continue;
                    }

                    if let Some(event) = parse_data_line(data) {
                        let is_terminal = matches!(event, StreamEvent::Error(_));
                        if tx.send(event).is_err() || is_terminal {
                            return;
                        }
                    }
                }
            }

            let _ = tx.send(StreamEvent::Done);
        });

        Ok(rx)
    }

    /// Records the model's completed turn so the next exchange carries it.
    pub fn record_reply(&mut self, text: &str) {
        self.history.push(json!({
            "role": "model",
            "parts": [{ "text": text }]
        }));
    }

    /// Drops the pending user turn after a failed exchange, so history never
    /// carries a question the model was not able to answer.
    pub fn discard_last_turn(&mut self) {
        self.history.pop();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Parses one SSE `data:` payload into a stream event. Chunks without text
/// parts (e.g. bare finish metadata) yield nothing.
fn parse_data_line(data: &str) -> Option<StreamEvent> {
    let value: Value = serde_json::from_str(data).ok()?;

    if let Some(error) = value.get("error") {
        let message = error["message"]
            .as_str()
            .unwrap_or("stream reported an unspecified error")
            .to_string();
        return Some(StreamEvent::Error(message));
    }

    let parts = value["candidates"][0]["content"]["parts"].as_array()?;
    let mut text = String::new();
    for part in parts {
        if let Some(piece) = part["text"].as_str() {
            text.push_str(piece);
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(StreamEvent::Fragment(text))
    }
}

/// Surfaces the API's own `error.message` when the body carries one, so
/// failure classification can match on it.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value["error"]["message"].as_str() {
            return message.to_string();
        }
    }
    format!("API returned error: {} - {}", status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureCategory;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_session(server: &MockServer) -> ChatSession {
        let config = Config {
            api_key: "test-key".to_string(),
            api_base: server.uri(),
        };
        ChatSession::new(&config).unwrap()
    }

    fn sse_chunk(text: &str) -> String {
        format!(
            "data: {}\n\n",
            json!({
                "candidates": [{
                    "content": { "parts": [{ "text": text }], "role": "model" }
                }]
            })
        )
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn streams_fragments_in_arrival_order() {
        let server = MockServer::start().await;
        let body = format!("{}{}{}", sse_chunk("Hel"), sse_chunk("lo "), sse_chunk("there"));

        Mock::given(method("POST"))
            .and(path(format!(
                "/v1beta/models/{}:streamGenerateContent",
                GEMINI_MODEL
            )))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let mut session = test_session(&server);
        let rx = session.send_message_stream("hi").await.unwrap();
        let events = collect(rx).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("Hel".to_string()),
                StreamEvent::Fragment("lo ".to_string()),
                StreamEvent::Fragment("there".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn surfaces_api_error_message_for_classification() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let mut session = test_session(&server);
        let err = session.send_message_stream("hi").await.unwrap_err();

        assert!(err.to_string().contains("API key not valid"));
        assert_eq!(
            FailureCategory::classify(&err.to_string()),
            FailureCategory::CredentialInvalid
        );
    }

    #[tokio::test]
    async fn mid_stream_error_event_terminates_the_stream() {
        let server = MockServer::start().await;
        let body = format!(
            "{}data: {}\n\n{}",
            sse_chunk("partial"),
            json!({ "error": { "message": "quota exceeded for today" } }),
            sse_chunk("never delivered")
        );

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let mut session = test_session(&server);
        let rx = session.send_message_stream("hi").await.unwrap();
        let events = collect(rx).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("partial".to_string()),
                StreamEvent::Error("quota exceeded for today".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn history_tracks_turns_across_the_exchange() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse_chunk("hi!"), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let mut session = test_session(&server);
        let rx = session.send_message_stream("hello").await.unwrap();
        collect(rx).await;
        session.record_reply("hi!");
        assert_eq!(session.history_len(), 2);

        // a failed exchange leaves no dangling user turn behind
        session.history.push(json!({ "role": "user", "parts": [{ "text": "again" }] }));
        session.discard_last_turn();
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn parse_skips_chunks_without_text() {
        let finish_only = json!({
            "candidates": [{ "finishReason": "STOP" }]
        });
        assert_eq!(parse_data_line(&finish_only.to_string()), None);
    }

    #[test]
    fn parse_joins_multiple_parts() {
        let chunk = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "a" }, { "text": "b" }] }
            }]
        });
        assert_eq!(
            parse_data_line(&chunk.to_string()),
            Some(StreamEvent::Fragment("ab".to_string()))
        );
    }
}
