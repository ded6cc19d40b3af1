//! Text-generation backends for draft emails.
//!
//! Two backends sit behind [`TextGenerator`]:
//!
//! - **Command**: a user-configured CLI (e.g. `claude --print ...`, `llm`,
//!   `ollama run`) that reads the prompt on stdin and prints JSON on stdout.
//!   A `{schema}` argument is replaced with the output schema.
//! - **HTTP**: an OpenAI-compatible `chat/completions` endpoint with a
//!   `json_schema` response format.
//!
//! Both return the same contract: a JSON object with `subject` and `body`.
//! Responses are parsed leniently (code fences, Claude `structured_output` or
//! `result` envelopes, leading prose), but never retried.
use crate::config::LmSettings;
use crate::error::{OutreachError, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Subject and body returned by a model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

/// A single, unretried structured-output model call.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, schema: &Value) -> Result<GeneratedEmail>;
}

/// Build the generator described by settings. A command takes precedence over
/// an API key.
pub fn generator_from_settings(settings: &LmSettings) -> Result<Box<dyn TextGenerator>> {
    if let Some(command) = settings.command.as_deref() {
        return Ok(Box::new(CommandGenerator::new(command)?));
    }
    if let Some(api_key) = settings.api_key.as_deref() {
        return Ok(Box::new(HttpGenerator::new(
            settings.base_url.clone(),
            api_key.to_string(),
            settings.model.clone(),
            settings.temperature,
        )));
    }
    Err(OutreachError::Configuration(
        "no model configured; set OUTREACH_LM_COMMAND or OPENAI_API_KEY".to_string(),
    ))
}

/// Runs a local command with the prompt on stdin.
#[derive(Debug)]
pub struct CommandGenerator {
    argv: Vec<String>,
}

impl CommandGenerator {
    /// Parse the command line and check that its program resolves.
    pub fn new(command: &str) -> Result<Self> {
        let argv = shell_words::split(command).map_err(|err| {
            OutreachError::Configuration(format!("parse LM command {command:?}: {err}"))
        })?;
        let Some(program) = argv.first() else {
            return Err(OutreachError::Configuration("LM command is empty".to_string()));
        };
        which::which(program).map_err(|err| {
            OutreachError::Configuration(format!("LM command {program:?} not found: {err}"))
        })?;
        Ok(Self { argv })
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str, schema: &Value) -> Result<GeneratedEmail> {
        let schema_text = schema.to_string();
        let mut argv: Vec<String> = self
            .argv
            .iter()
            .map(|arg| {
                if arg == "{schema}" {
                    schema_text.clone()
                } else {
                    arg.clone()
                }
            })
            .collect();
        let program = argv.remove(0);

        let start = Instant::now();
        let mut child = Command::new(&program)
            .args(&argv)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| OutreachError::Generation(format!("spawn {program}: {err}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .map_err(|err| OutreachError::Generation(format!("write prompt: {err}")))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| OutreachError::Generation(format!("wait for {program}: {err}")))?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm invoke complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OutreachError::Generation(format!(
                "LM command failed with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        parse_email_response(&String::from_utf8_lossy(&output.stdout))
    }
}

/// OpenAI-compatible chat completions client.
pub struct HttpGenerator {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl HttpGenerator {
    pub fn new(base_url: String, api_key: String, model: String, temperature: f32) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
        }
    }

    fn request_body(&self, prompt: &str, schema: &Value) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "outreach_email", "strict": true, "schema": schema }
            }
        })
    }
}

impl TextGenerator for HttpGenerator {
    fn generate(&self, prompt: &str, schema: &Value) -> Result<GeneratedEmail> {
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(self.request_body(prompt, schema))
            .map_err(|err| OutreachError::Generation(err.to_string()))?;
        let status = response.status();
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            status = status.as_u16(),
            prompt_bytes = prompt.len(),
            "lm http call complete"
        );
        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(OutreachError::Generation(format!(
                "model endpoint returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        let chat: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|err| OutreachError::MalformedResponse(err.to_string()))?;
        let message = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| OutreachError::MalformedResponse("no choices in response".to_string()))?;
        if let Some(refusal) = message.refusal.filter(|text| !text.trim().is_empty()) {
            return Err(OutreachError::Generation(format!("model refused: {refusal}")));
        }
        let content = message
            .content
            .ok_or_else(|| OutreachError::MalformedResponse("empty message content".to_string()))?;
        parse_email_response(&content)
    }
}

/// Parse model output into a subject/body pair. Accepts bare JSON, fenced
/// JSON, JSON after leading prose, and Claude CLI envelopes.
pub fn parse_email_response(text: &str) -> Result<GeneratedEmail> {
    let value = extract_structured_output(text)?;
    serde_json::from_value(value)
        .map_err(|err| OutreachError::MalformedResponse(format!("expected subject and body: {err}")))
}

fn extract_structured_output(text: &str) -> Result<Value> {
    let cleaned = strip_code_fences(text);
    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(err) => extract_json_from_text(&cleaned).ok_or_else(|| {
            OutreachError::MalformedResponse(format!(
                "response JSON failed to parse: {err}; first 200 chars: {}",
                cleaned.chars().take(200).collect::<String>()
            ))
        })?,
    };

    if let Some(structured) = value.get("structured_output") {
        return Ok(structured.clone());
    }
    if let Some(result) = value.get("result").and_then(Value::as_str) {
        return extract_structured_output(result);
    }
    Ok(value)
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.first().is_some_and(|first| first.trim_start().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|last| last.trim_start().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

fn extract_json_from_text(raw: &str) -> Option<Value> {
    for (idx, ch) in raw.char_indices() {
        if ch != '{' {
            continue;
        }
        let mut deserializer = serde_json::Deserializer::from_str(&raw[idx..]);
        if let Ok(value) = Value::deserialize(&mut deserializer) {
            return Some(value);
        }
    }
    None
}
