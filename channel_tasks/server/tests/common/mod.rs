#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use channel_tasks_core::TaskList;
use channel_tasks_server::clock::FixedClock;
use channel_tasks_server::context::AppContext;
use channel_tasks_server::host::{Channel, ChatHost, HostError};
use channel_tasks_server::store::{InMemoryKvStore, KvStore, StoreError};
use channel_tasks_server::web::auth::USER_ID_HEADER;
use channel_tasks_server::web::create_router;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};
use tokio::sync::Notify;
use tower::ServiceExt;

/// Wednesday 2024-06-05 10:00 UTC, the "now" of every endpoint test.
pub fn now() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0)
        .unwrap()
        .fixed_offset()
}

pub fn utc(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub user_id: String,
    pub message: String,
}

/// Chat host serving a fixed set of channels and recording every direct message.
#[derive(Default)]
pub struct RecordingChatHost {
    channels: Vec<Channel>,
    sent: Mutex<Vec<SentMessage>>,
    delivered: Notify,
}

impl RecordingChatHost {
    pub fn with_channels(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Waits until at least `count` messages were sent by background digests.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<SentMessage> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let sent = self.sent();
                if sent.len() >= count {
                    return sent;
                }
                self.delivered.notified().await;
            }
        })
        .await
        .expect("timed out waiting for direct messages")
    }
}

#[async_trait]
impl ChatHost for RecordingChatHost {
    async fn channels_for_user(&self, _user_id: &str) -> Result<Vec<Channel>, HostError> {
        Ok(self.channels.clone())
    }

    async fn channel(&self, channel_id: &str) -> Result<Channel, HostError> {
        self.channels
            .iter()
            .find(|channel| channel.id == channel_id)
            .cloned()
            .ok_or(HostError::NotConfigured)
    }

    async fn send_direct_message(&self, user_id: &str, message: &str) -> Result<(), HostError> {
        self.sent.lock().unwrap().push(SentMessage {
            user_id: user_id.to_string(),
            message: message.to_string(),
        });
        self.delivered.notify_one();
        Ok(())
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Everything an endpoint test needs: the router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryKvStore>,
    pub host: Arc<RecordingChatHost>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_channels(vec![Channel::new("c1", "Town Square")])
    }

    pub fn with_channels(channels: Vec<Channel>) -> Self {
        let store = Arc::new(InMemoryKvStore::new());
        let host = Arc::new(RecordingChatHost::with_channels(channels));
        let context = AppContext::new(store.clone(), host.clone(), Arc::new(FixedClock(now())))
            .with_bot_user_id("bot");
        Self {
            router: create_router(context),
            store,
            host,
        }
    }

    pub async fn seed(&self, key: &str, list: &TaskList) {
        self.store
            .set(key, serde_json::to_vec(list).unwrap())
            .await
            .unwrap();
    }

    pub async fn stored_json(&self, key: &str) -> Option<serde_json::Value> {
        self.store
            .get(key)
            .await
            .unwrap()
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, String) {
        send(&self.router, method, uri, user_id, body).await
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    user_id: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(USER_ID_HEADER, user_id);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn app_with_failing_store() -> Router {
    let context = AppContext::new(
        Arc::new(FailingStore),
        Arc::new(RecordingChatHost::default()),
        Arc::new(FixedClock(now())),
    );
    create_router(context)
}

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
