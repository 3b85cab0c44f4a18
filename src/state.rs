use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{Clock, LogMailer, Mailer, SmtpMailer, SystemClock, TokenService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub mailer: Arc<dyn Mailer>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer: Arc<dyn Mailer> = if config.mail.smtp_enabled {
            Arc::new(SmtpMailer::new(&config.mail)?)
        } else {
            Arc::new(LogMailer)
        };

        Self::with_services(config, mailer, Arc::new(SystemClock)).await
    }

    /// Builds the state with an injected mailer and clock. Used by tests to
    /// avoid real SMTP and to control token expiry.
    pub async fn with_services(
        config: Config,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = Arc::new(TokenService::new(&config.auth, clock));

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            mailer,
        })
    }
}
