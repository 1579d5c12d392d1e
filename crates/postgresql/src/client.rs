//! Connection setup.

use anyhow::{Context, Result};
use tokio_postgres::{Client, NoTls};

/// Open a connection and drive it on a background task.
pub async fn connect(connection_string: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

/// One PostgreSQL database, usable both as a primary-key catalog and as a row source.
pub struct PostgresDatabase {
    pub(crate) client: Client,
    pub(crate) label: String,
}

impl PostgresDatabase {
    /// Connect to `connection_string`. `label` names the database in log output.
    pub async fn connect(connection_string: &str, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let client = connect(connection_string)
            .await
            .with_context(|| format!("Failed to connect to the {label} database"))?;
        Ok(Self::with_client(client, label))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, label: impl Into<String>) -> Self {
        Self {
            client,
            label: label.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
