mod pacer;

pub use pacer::FixedDelayPacer;

use async_trait::async_trait;
use replay_core::domain::{AttachmentKind, ResolvedMedia};
use replay_core::error::ReplayError;
use replay_core::ports::{OutboundChannel, Result};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    id: i64,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    #[serde(default)]
    title: Option<String>,
}

/// Bot API method and form field used to upload each kind of media
fn upload_method(kind: AttachmentKind) -> (&'static str, &'static str) {
    match kind {
        AttachmentKind::Photo => ("sendPhoto", "photo"),
        AttachmentKind::Video => ("sendVideo", "video"),
        AttachmentKind::Audio => ("sendAudio", "audio"),
        AttachmentKind::Document => ("sendDocument", "document"),
    }
}

/// Telegram Bot API implementation of the OutboundChannel trait
pub struct TelegramBotChannel {
    name: String,
    api_base: String,
    token: String,
    target_chat: String,
    client: reqwest::Client,
    resolved_chat: Option<i64>,
}

impl TelegramBotChannel {
    /// Creates a new TelegramBotChannel; nothing is sent until `open`
    pub fn new(
        name: impl Into<String>,
        api_base: impl Into<String>,
        token: impl Into<String>,
        target_chat: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_base: api_base.into(),
            token: token.into(),
            target_chat: target_chat.into(),
            client: reqwest::Client::new(),
            resolved_chat: None,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.token,
            method
        )
    }

    fn chat_id(&self) -> Result<i64> {
        self.resolved_chat
            .ok_or_else(|| ReplayError::channel(&self.name, "session is not open"))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| ReplayError::channel(&self.name, e.without_url()))?;
        self.read_response(method, response).await
    }

    async fn post_form<T: DeserializeOwned>(&self, method: &str, form: Form) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ReplayError::channel(&self.name, e.without_url()))?;
        self.read_response(method, response).await
    }

    // Error responses also carry a JSON body, so the status code is not checked first
    async fn read_response<T: DeserializeOwned>(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| ReplayError::channel(&self.name, e.without_url()))?;
        decode_response(&self.name, method, &body)
    }
}

fn decode_response<T: DeserializeOwned>(channel: &str, method: &str, body: &str) -> Result<T> {
    let response: ApiResponse<T> = serde_json::from_str(body)
        .map_err(|e| ReplayError::channel(channel, format!("{method}: invalid response: {e}")))?;
    if !response.ok {
        let description = response
            .description
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ReplayError::channel(channel, format!("{method}: {description}")));
    }
    response
        .result
        .ok_or_else(|| ReplayError::channel(channel, format!("{method}: missing result")))
}

#[async_trait]
impl OutboundChannel for TelegramBotChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&mut self) -> Result<()> {
        let me: BotUser = self.post_json("getMe", json!({})).await?;
        let chat: Chat = self
            .post_json("getChat", json!({ "chat_id": self.target_chat }))
            .await?;
        info!(
            "{} started as {} (id {}), target chat {} ({})",
            self.name,
            me.username.as_deref().unwrap_or("bot"),
            me.id,
            chat.title.as_deref().unwrap_or(&self.target_chat),
            chat.id
        );
        self.resolved_chat = Some(chat.id);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let chat_id = self.chat_id()?;
        let _: serde_json::Value = self
            .post_json("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn send_media(&self, media: &ResolvedMedia, caption: &str) -> Result<()> {
        let chat_id = self.chat_id()?;
        let bytes = tokio::fs::read(&media.path).await?;
        let file_name = media
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let (method, field) = upload_method(media.kind);
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(field, Part::bytes(bytes).file_name(file_name));

        let _: serde_json::Value = self.post_form(method, form).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.resolved_chat.take().is_some() {
            info!("{} disconnected", self.name);
        }
        Ok(())
    }
}
