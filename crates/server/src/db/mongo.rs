//! MongoDB implementation of [`Connector`] and [`DocumentStore`].

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{bson::doc, options::ClientOptions, Client};
use tracing::debug;

use super::{Connector, DbError, DocumentStore};
use crate::config::DatabaseSettings;

const APP_NAME: &str = "codecon-server";

/// Connects to MongoDB using the official driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, settings: &DatabaseSettings) -> Result<Arc<dyn DocumentStore>, DbError> {
        let mut options = ClientOptions::parse(settings.uri.as_str())
            .await
            .map_err(|e| DbError::InvalidUri(e.to_string()))?;

        // Timeouts set in the URI take precedence over the service default.
        if options.server_selection_timeout.is_none() {
            options.server_selection_timeout = Some(settings.connect_timeout);
        }
        if options.connect_timeout.is_none() {
            options.connect_timeout = Some(settings.connect_timeout);
        }
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.into());
        }

        let host = options
            .hosts
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".into());

        let client = Client::with_options(options).map_err(|e| DbError::InvalidUri(e.to_string()))?;

        // The driver connects lazily; only a successful ping proves the server is there.
        let store = MongoStore { client, host };
        store.ping().await?;
        debug!(host = %store.host, "mongodb ping succeeded");

        Ok(Arc::new(store))
    }
}

/// A connected MongoDB client.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    host: String,
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn host(&self) -> String {
        self.host.clone()
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| DbError::Unreachable(e.to_string()))
    }

    async fn close(&self) -> Result<(), DbError> {
        // Outstanding operations are not awaited: shutdown does not drain.
        let client = self.client.clone();
        tokio::spawn(async move { client.shutdown().immediate(true).await })
            .await
            .map_err(|e| DbError::Close(e.to_string()))
    }
}
