//! Collector: pulls channel history into a message table.
//!
//! The network side sits behind [`MessageSource`] so the collection loop
//! (entity lookup, message iteration, optional photo download, one CSV row
//! per message) does not depend on a particular client. The MTProto client
//! lives in [`telegram`] behind the `telegram` feature.

#[cfg(feature = "telegram")]
pub mod telegram;

use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};

use crate::config::CollectorConfig;
use crate::dataset::{MessageRow, RowWriter};
use crate::error::CollectorError;

/// Layout of the `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// A channel resolved by a [`MessageSource`].
#[derive(Debug, Clone)]
pub struct ResolvedChannel<C> {
    /// Identifier as given by the caller; used as the grouping key.
    pub username: String,
    /// Display title.
    pub title: String,
    /// Client-specific handle.
    pub handle: C,
}

/// One message fetched from a channel.
#[derive(Debug, Clone)]
pub struct CollectedMessage<M> {
    pub id: i64,
    pub text: Option<String>,
    pub date: DateTime<Utc>,
    /// Attached photo, if any.
    pub photo: Option<M>,
}

/// Stream of messages from one channel, newest first.
pub type MessageStream<'a, M> =
    Pin<Box<dyn Stream<Item = Result<CollectedMessage<M>, CollectorError>> + Send + 'a>>;

/// A remote messaging service the collector reads from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Client handle for a resolved channel.
    type Chat: Send + Sync;
    /// Client handle for downloadable media.
    type Media: Send + Sync;

    /// Source name for logs.
    fn name(&self) -> &str;

    /// Look up a channel by username or link.
    async fn resolve(&self, channel: &str) -> Result<ResolvedChannel<Self::Chat>, CollectorError>;

    /// Iterate up to `limit` messages of a channel.
    async fn messages<'a>(
        &'a self,
        channel: &'a ResolvedChannel<Self::Chat>,
        limit: usize,
    ) -> Result<MessageStream<'a, Self::Media>, CollectorError>;

    /// Save a photo to `path`.
    async fn download_photo(&self, media: &Self::Media, path: &Path) -> Result<(), CollectorError>;

    /// Close the connection.
    async fn disconnect(&self) -> Result<(), CollectorError> {
        Ok(())
    }
}

/// Counts from one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectSummary {
    pub channels: usize,
    pub messages: usize,
    pub photos: usize,
}

/// Writes the history of a list of channels to one CSV file.
pub struct Collector<S> {
    config: CollectorConfig,
    source: S,
}

impl<S: MessageSource> Collector<S> {
    pub fn new(config: CollectorConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Photo destination for one message.
    pub fn media_path(&self, channel: &str, message_id: i64) -> PathBuf {
        let channel = channel.replace(['/', '\\'], "_");
        self.config
            .media_dir
            .join(format!("{channel}_{message_id}.jpg"))
    }

    /// Collect every channel in order. Any network or output error stops
    /// the run.
    pub async fn run(&self, channels: &[String]) -> Result<CollectSummary, CollectorError> {
        if self.config.download_media {
            tokio::fs::create_dir_all(&self.config.media_dir).await?;
        }

        let mut writer = RowWriter::create(&self.config.output_path)?;
        let mut summary = CollectSummary::default();

        for channel in channels {
            let resolved = self.source.resolve(channel).await?;
            let (messages, photos) = self.collect_channel(&resolved, &mut writer).await?;

            summary.channels += 1;
            summary.messages += messages;
            summary.photos += photos;
            tracing::info!(
                source = self.source.name(),
                channel = %resolved.username,
                title = %resolved.title,
                messages,
                photos,
                "Scraped channel"
            );
        }

        writer.finish()?;
        self.source.disconnect().await?;

        tracing::info!(
            output = %self.config.output_path.display(),
            channels = summary.channels,
            messages = summary.messages,
            photos = summary.photos,
            "Collection finished"
        );
        Ok(summary)
    }

    async fn collect_channel(
        &self,
        channel: &ResolvedChannel<S::Chat>,
        writer: &mut RowWriter,
    ) -> Result<(usize, usize), CollectorError> {
        let mut stream = self
            .source
            .messages(channel, self.config.message_limit)
            .await?;
        let mut messages = 0;
        let mut photos = 0;

        while let Some(message) = stream.next().await {
            let message = message?;

            let media_path = match (&message.photo, self.config.download_media) {
                (Some(photo), true) => {
                    let path = self.media_path(&channel.username, message.id);
                    self.source.download_photo(photo, &path).await?;
                    photos += 1;
                    Some(path.display().to_string())
                }
                _ => None,
            };

            writer.write_row(&MessageRow {
                channel_title: channel.title.clone(),
                channel_username: channel.username.clone(),
                message_id: message.id,
                message: message.text,
                date: message.date.format(DATE_FORMAT).to_string(),
                media_path,
            })?;
            messages += 1;
        }
        Ok((messages, photos))
    }
}
