//! Live feed of other users' uploads, fed by a push channel.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use chrono::NaiveDateTime;
use futures::{Stream, StreamExt};
use shared::protocol::{FeedEvent, NewUploadPayload};
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{FeedError, SettingsError},
    settings::ClientSettings,
    view::resolve_asset_url,
    ClientEvent, EVENT_CHANNEL_CAPACITY,
};

const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub image_url: String,
    pub username: String,
    pub caption: String,
    pub uploaded_at: Option<NaiveDateTime>,
}

impl FeedEntry {
    pub fn from_payload(payload: &NewUploadPayload, base: &Url) -> Self {
        Self {
            image_url: resolve_asset_url(base, &payload.image_url),
            username: payload.username.clone(),
            caption: format!("Uploaded {}", payload.filename),
            uploaded_at: payload
                .upload_date
                .as_deref()
                .and_then(|raw| NaiveDateTime::parse_from_str(raw, UPLOAD_DATE_FORMAT).ok()),
        }
    }
}

/// Newest first. Grows without bound.
#[derive(Debug, Clone, Default)]
pub struct LiveFeed {
    entries: VecDeque<FeedEntry>,
}

impl LiveFeed {
    pub fn prepend(&mut self, entry: FeedEntry) {
        self.entries.push_front(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

pub struct LiveFeedListener {
    base_url: Url,
    feed_url: String,
    reconnect_delay: Duration,
    feed: RwLock<LiveFeed>,
    events: broadcast::Sender<ClientEvent>,
}

impl LiveFeedListener {
    pub fn new(settings: &ClientSettings) -> Result<Arc<Self>, SettingsError> {
        Ok(Self::with_urls(
            settings.base_url()?,
            settings.feed_url()?,
            settings.feed_reconnect_delay(),
        ))
    }

    pub fn with_urls(base_url: Url, feed_url: String, reconnect_delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            base_url,
            feed_url,
            reconnect_delay,
            feed: RwLock::new(LiveFeed::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    pub async fn entries(&self) -> Vec<FeedEntry> {
        self.feed.read().await.entries().cloned().collect()
    }

    /// Applies one push frame. Returns the entry it added, if any.
    pub async fn apply_frame(&self, text: &str) -> Option<FeedEntry> {
        let event = match FeedEvent::decode(text) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("ignoring push event of another type");
                return None;
            }
            Err(err) => {
                warn!(%err, "skipping malformed live feed frame");
                return None;
            }
        };

        match event {
            FeedEvent::NewUpload(payload) => {
                let entry = FeedEntry::from_payload(&payload, &self.base_url);
                self.feed.write().await.prepend(entry.clone());
                debug!(username = %entry.username, "live feed entry added");
                let _ = self.events.send(ClientEvent::FeedEntryAdded(entry.clone()));
                Some(entry)
            }
        }
    }

    /// Drains a stream of text frames; returns how many entries were added.
    pub async fn consume<S>(&self, frames: S) -> usize
    where
        S: Stream<Item = String>,
    {
        let mut frames = std::pin::pin!(frames);
        let mut added = 0;
        while let Some(text) = frames.next().await {
            if self.apply_frame(&text).await.is_some() {
                added += 1;
            }
        }
        added
    }

    /// Connects once and consumes frames until the socket closes or fails.
    pub async fn run_connection(&self) -> Result<(), FeedError> {
        self.publish_connection(FeedConnectionState::Connecting);
        let (ws_stream, _) =
            connect_async(self.feed_url.as_str())
                .await
                .map_err(|source| FeedError::Connect {
                    url: self.feed_url.clone(),
                    source,
                })?;
        info!(url = %self.feed_url, "live feed connected");
        self.publish_connection(FeedConnectionState::Connected);

        let (_, mut ws_reader) = ws_stream.split();
        while let Some(msg) = ws_reader.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    self.apply_frame(&text).await;
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "live feed receive failed");
                    let _ = self
                        .events
                        .send(ClientEvent::Error(format!("live feed receive failed: {err}")));
                    break;
                }
            }
        }

        info!(url = %self.feed_url, "live feed disconnected");
        self.publish_connection(FeedConnectionState::Disconnected);
        Ok(())
    }

    /// Keeps the feed connected, reconnecting after a fixed delay. Abort the
    /// handle to stop.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let listener = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if let Err(err) = listener.run_connection().await {
                    warn!(%err, "live feed connection failed");
                    let _ = listener.events.send(ClientEvent::Error(err.to_string()));
                    listener.publish_connection(FeedConnectionState::Disconnected);
                }
                tokio::time::sleep(listener.reconnect_delay).await;
            }
        })
    }

    fn publish_connection(&self, state: FeedConnectionState) {
        let _ = self.events.send(ClientEvent::FeedConnection(state));
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
