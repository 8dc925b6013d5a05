//! Telegram source: MTProto user-account client via grammers.
//!
//! Logs in with the configured API id/hash and phone number. On first use
//! the login code (and the 2FA password, when set) is read from stdin and
//! the authorized session is persisted to the session file.

use std::path::Path;

use async_trait::async_trait;
use grammers_client::types::{Chat, Downloadable, Media, Message};
use grammers_client::{Client, Config, SignInError};
use grammers_session::Session;
use secrecy::ExposeSecret;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::collector::{CollectedMessage, MessageSource, MessageStream, ResolvedChannel};
use crate::config::CollectorConfig;
use crate::error::CollectorError;

/// Channel history reader backed by a logged-in Telegram account.
pub struct TelegramSource {
    client: Client,
}

impl TelegramSource {
    /// Connect and make sure the session is authorized.
    pub async fn connect(config: &CollectorConfig) -> Result<Self, CollectorError> {
        let session = Session::load_file_or_create(&config.session_file)?;
        let client = Client::connect(Config {
            session,
            api_id: config.api_id,
            api_hash: config.api_hash.expose_secret().to_string(),
            params: Default::default(),
        })
        .await
        .map_err(|e| CollectorError::AuthFailed(e.to_string()))?;

        let source = Self { client };
        if !source.is_authorized().await? {
            source.sign_in(&config.phone).await?;
            source
                .client
                .session()
                .save_to_file(&config.session_file)?;
            tracing::info!(session = %config.session_file.display(), "Telegram session saved");
        }
        Ok(source)
    }

    async fn is_authorized(&self) -> Result<bool, CollectorError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| CollectorError::AuthFailed(e.to_string()))
    }

    async fn sign_in(&self, phone: &str) -> Result<(), CollectorError> {
        let token = self
            .client
            .request_login_code(phone)
            .await
            .map_err(|e| CollectorError::AuthFailed(e.to_string()))?;
        let code = prompt("Enter the code you received: ").await?;

        match self.client.sign_in(&token, &code).await {
            Ok(_) => Ok(()),
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().unwrap_or("none").to_string();
                let password = prompt(&format!("Enter the password (hint: {hint}): ")).await?;
                self.client
                    .check_password(password_token, password.trim())
                    .await
                    .map(|_| ())
                    .map_err(|e| CollectorError::AuthFailed(e.to_string()))
            }
            Err(e) => Err(CollectorError::AuthFailed(e.to_string())),
        }
    }
}

/// Ask on stderr, read one trimmed line from stdin.
async fn prompt(message: &str) -> Result<String, CollectorError> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(message.as_bytes()).await?;
    stderr.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim().to_string())
}

fn collected(message: &Message) -> CollectedMessage<Media> {
    let text = message.text();
    CollectedMessage {
        id: i64::from(message.id()),
        text: (!text.is_empty()).then(|| text.to_string()),
        date: message.date(),
        photo: message
            .media()
            .filter(|media| matches!(media, Media::Photo(_))),
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    type Chat = Chat;
    type Media = Media;

    fn name(&self) -> &str {
        "telegram"
    }

    async fn resolve(&self, channel: &str) -> Result<ResolvedChannel<Chat>, CollectorError> {
        let username = channel
            .trim_start_matches("https://t.me/")
            .trim_start_matches('@');
        let chat = self
            .client
            .resolve_username(username)
            .await
            .map_err(|e| CollectorError::ResolveFailed {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| CollectorError::ResolveFailed {
                channel: channel.to_string(),
                reason: "username not found".into(),
            })?;

        Ok(ResolvedChannel {
            username: channel.to_string(),
            title: chat.name().to_string(),
            handle: chat,
        })
    }

    async fn messages<'a>(
        &'a self,
        channel: &'a ResolvedChannel<Chat>,
        limit: usize,
    ) -> Result<MessageStream<'a, Media>, CollectorError> {
        let iter = self.client.iter_messages(&channel.handle).limit(limit);
        let name = channel.username.as_str();

        let stream = futures::stream::try_unfold(iter, move |mut iter| async move {
            match iter.next().await {
                Ok(Some(message)) => Ok(Some((collected(&message), iter))),
                Ok(None) => Ok(None),
                Err(e) => Err(CollectorError::FetchFailed {
                    channel: name.to_string(),
                    reason: e.to_string(),
                }),
            }
        });
        Ok(Box::pin(stream))
    }

    async fn download_photo(&self, media: &Media, path: &Path) -> Result<(), CollectorError> {
        self.client
            .download_media(&Downloadable::Media(media.clone()), path)
            .await
            .map_err(|e| CollectorError::DownloadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}
