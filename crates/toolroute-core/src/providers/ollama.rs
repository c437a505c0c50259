//! Ollama adapter
//!
//! Talks to a local or remote Ollama server over its native HTTP API.
//! Chat replies are streamed as newline-delimited JSON and concatenated
//! before being handed back, so callers only ever see the complete text.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, Provider, FORMAT_OPTION, KEEP_ALIVE_OPTION};
use crate::config::OllamaSettings;
use crate::log_debug;
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage};

const PROVIDER: &str = "ollama";
const USER_AGENT: &str = "toolroute";

/// Largest single NDJSON line accepted from the server (512 KiB)
const MAX_LINE_BYTES: usize = 512 * 1024;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<Value>,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatStreamLine {
    #[serde(default)]
    message: Option<StreamMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

/// One decoded line of a streamed chat reply
#[derive(Debug, PartialEq)]
struct StreamPart {
    content: String,
    done: bool,
}

/// Ollama chat adapter
pub struct OllamaProvider {
    base: Url,
    model: String,
    keep_alive_secs: Option<u64>,
    http: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl OllamaProvider {
    /// Create an adapter for the server at `host`
    pub fn new(host: &str, model: impl Into<String>, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        let base = Url::parse(host)
            .map_err(|e| ProviderError::invalid_endpoint(PROVIDER, host, e.to_string()))?;

        Ok(Self {
            base,
            model: model.into(),
            keep_alive_secs: None,
            http: reqwest::Client::new(),
            logger,
        })
    }

    /// Create an adapter from configuration
    pub fn from_settings(settings: &OllamaSettings, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        let mut provider = Self::new(&settings.host, settings.model.clone(), logger)?;
        provider.keep_alive_secs = settings.keep_alive_secs;
        Ok(provider)
    }

    /// Use a caller-supplied HTTP client (timeouts, proxies, ...)
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Pull the keys Ollama takes at the top level out of the option map;
    /// whatever remains is forwarded as model options.
    fn split_options(&self, mut options: ChatOptions) -> (Option<String>, Option<Value>, ChatOptions) {
        let format = options
            .remove(FORMAT_OPTION)
            .and_then(|v| v.as_str().map(str::to_string));
        let keep_alive = options
            .remove(KEEP_ALIVE_OPTION)
            .or_else(|| self.keep_alive_secs.map(Value::from));
        (format, keep_alive, options)
    }

    /// Compute an embedding vector for `prompt`
    pub async fn embed(&self, model: &str, prompt: &str) -> ProviderResult<Vec<f64>> {
        let response = self
            .http
            .post(self.endpoint("api/embeddings"))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .json(&EmbeddingRequest { model, prompt })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)?;
        Ok(parsed.embedding)
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
        cancel_token: &CancellationToken,
    ) -> ProviderResult<String> {
        let (format, keep_alive, options) = self.split_options(options);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
            format,
            keep_alive,
            options,
        };

        let response = self
            .http
            .post(self.endpoint("api/chat"))
            .header("Accept", "application/x-ndjson")
            .header("User-Agent", USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let mut stream = response.bytes_stream();
        let mut assembler = StreamAssembler::default();

        while let Some(chunk) = stream.next().await {
            if cancel_token.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            if assembler.push(&chunk?)? {
                break;
            }
        }

        assembler.finish()
    }
}

/// Reassembles a streamed chat reply from arbitrary byte chunks
///
/// Lines are only decoded once their newline arrives, so chunk boundaries
/// may fall anywhere, including inside a multi-byte character.
#[derive(Debug, Default)]
struct StreamAssembler {
    buffer: Vec<u8>,
    reply: String,
    done: bool,
}

impl StreamAssembler {
    /// Feed one chunk; returns `true` once the server has marked the reply done
    fn push(&mut self, chunk: &[u8]) -> ProviderResult<bool> {
        if self.done {
            return Ok(true);
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(part) = parse_stream_line(&line)? {
                self.reply.push_str(&part.content);
                if part.done {
                    self.done = true;
                    self.buffer.clear();
                    return Ok(true);
                }
            }
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            return Err(ProviderError::stream(PROVIDER, "stream line exceeds 512 KiB"));
        }
        Ok(false)
    }

    /// The assembled reply, decoding a final line that had no newline
    fn finish(mut self) -> ProviderResult<String> {
        if !self.done {
            if let Some(part) = parse_stream_line(&self.buffer)? {
                self.reply.push_str(&part.content);
            }
        }
        Ok(self.reply)
    }
}

/// Decode one NDJSON line; blank lines yield `None`
fn parse_stream_line(line: &[u8]) -> ProviderResult<Option<StreamPart>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let parsed: ChatStreamLine = serde_json::from_str(text)?;
    if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
        return Err(ProviderError::stream(PROVIDER, error));
    }

    Ok(Some(StreamPart {
        content: parsed.message.map(|m| m.content).unwrap_or_default(),
        done: parsed.done,
    }))
}

/// Build an API error, preferring the server's `{"error": ...}` message
fn status_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    ProviderError::api_error(PROVIDER, status, message)
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<String> {
        log_debug!(
            self.logger,
            "[OllamaProvider] chat: model={}, messages={}",
            self.model,
            messages.len()
        );

        match cancel_token
            .run_until_cancelled(self.send_chat(&messages, options, &cancel_token))
            .await
        {
            Some(result) => result,
            None => Err(ProviderError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn provider() -> OllamaProvider {
        OllamaProvider::new("http://localhost:11434", "llama3", NoOpLogger::shared()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_host() {
        let err = OllamaProvider::new("not a url", "llama3", NoOpLogger::shared())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let p = OllamaProvider::new("http://gpu-box:11434/", "llama3", NoOpLogger::shared()).unwrap();
        assert_eq!(p.endpoint("api/chat"), "http://gpu-box:11434/api/chat");
        assert_eq!(p.endpoint("/api/embeddings"), "http://gpu-box:11434/api/embeddings");
    }

    #[test]
    fn test_split_options() {
        let mut p = provider();
        p.keep_alive_secs = Some(300);

        let mut options = ChatOptions::new();
        options.insert(FORMAT_OPTION.to_string(), json!("json"));
        options.insert("temperature".to_string(), json!(0.1));

        let (format, keep_alive, rest) = p.split_options(options);
        assert_eq!(format.as_deref(), Some("json"));
        assert_eq!(keep_alive, Some(json!(300)));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.get("temperature"), Some(&json!(0.1)));
    }

    #[test]
    fn test_chat_request_shape() {
        let messages = vec![ChatMessage::system("tools"), ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "llama3",
            messages: &messages,
            stream: true,
            format: Some("json".to_string()),
            keep_alive: None,
            options: ChatOptions::new(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3");
        assert_eq!(value["format"], "json");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert!(value.get("keep_alive").is_none());
    }

    #[test]
    fn test_parse_stream_lines() {
        let part = parse_stream_line(br#"{"message":{"role":"assistant","content":"{\"tool\""},"done":false}"#)
            .unwrap()
            .unwrap();
        assert_eq!(part.content, "{\"tool\"");
        assert!(!part.done);

        let last = parse_stream_line(b"{\"done\":true,\"done_reason\":\"stop\"}\n").unwrap().unwrap();
        assert_eq!(last, StreamPart { content: String::new(), done: true });

        assert!(parse_stream_line(b"  \n").unwrap().is_none());
    }

    fn assemble<I>(chunks: I) -> ProviderResult<String>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut assembler = StreamAssembler::default();
        for chunk in chunks {
            if assembler.push(chunk.as_ref())? {
                break;
            }
        }
        assembler.finish()
    }

    fn content_line(content: &str, done: bool) -> Vec<u8> {
        let mut line = serde_json::to_vec(&json!({
            "model": "llama3",
            "message": { "role": "assistant", "content": content },
            "done": done
        }))
        .unwrap();
        line.push(b'\n');
        line
    }

    #[test]
    fn test_assemble_line_split_inside_multibyte_char() {
        let line = content_line("Jakarta ☀ 31°C", true);
        let sun = line.windows(3).position(|w| w == "☀".as_bytes()).unwrap();
        let (head, tail) = line.split_at(sun + 1);

        assert_eq!(assemble([head, tail]).unwrap(), "Jakarta ☀ 31°C");
    }

    #[test]
    fn test_assemble_two_lines_in_one_chunk() {
        let mut chunk = content_line("{\"tool\":", false);
        chunk.extend(content_line("\"search\"}", false));
        let last = content_line("", true);

        assert_eq!(assemble([chunk, last]).unwrap(), "{\"tool\":\"search\"}");
    }

    #[test]
    fn test_assemble_stops_at_done() {
        let mut chunk = content_line("hi", true);
        chunk.extend_from_slice(b"garbage that is not json\n{\"trunc");
        let after = b"ated\n".to_vec();

        assert_eq!(assemble([chunk, after]).unwrap(), "hi");
    }

    #[test]
    fn test_assemble_rejects_oversized_line() {
        let partial = vec![b'x'; MAX_LINE_BYTES + 1];
        let err = assemble([partial]).unwrap_err();
        assert!(matches!(err, ProviderError::Stream { .. }));

        // The cap applies to one line, not the whole reply.
        let mut assembler = StreamAssembler::default();
        let filler = "a".repeat(1024);
        for _ in 0..600 {
            assert!(!assembler.push(&content_line(&filler, false)).unwrap());
        }
        assert_eq!(assembler.finish().unwrap().len(), 600 * 1024);
    }

    #[test]
    fn test_assemble_final_line_without_newline() {
        let first = content_line("{\"tool\":\"a\",", false);
        let last = br#"{"message":{"content":"\"toolInput\":{}}"},"done":true}"#.to_vec();

        assert_eq!(assemble([first, last]).unwrap(), r#"{"tool":"a","toolInput":{}}"#);
    }

    #[test]
    fn test_assemble_surfaces_error_line() {
        let first = content_line("partial", false);
        let err_line = b"{\"error\":\"model crashed\"}\n".to_vec();

        let err = assemble([first, err_line]).unwrap_err();
        assert!(matches!(err, ProviderError::Stream { .. }));
    }

    #[test]
    fn test_parse_stream_error_line() {
        let err = parse_stream_line(br#"{"error":"model 'llama9' not found"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Stream { .. }));
        assert!(err.to_string().contains("llama9"));
    }

    #[test]
    fn test_status_error_message() {
        let err = status_error(404, r#"{"error":"model not found"}"#);
        assert_eq!(err.to_string(), "ollama API error (404): model not found");

        let err = status_error(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "ollama API error (502): Bad Gateway");
    }
}
