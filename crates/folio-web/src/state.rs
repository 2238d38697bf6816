use std::sync::Arc;

use folio_core::{Authenticator, Clock, CoreResult, RateLimiter};

use crate::config::ServerConfig;
use crate::dto::{timestamp, Timestamp};
use crate::notify::Notifier;
use crate::store::ContentStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub clock: Arc<dyn Clock>,
    pub authenticator: Arc<Authenticator>,
    /// Throttles public contact submissions.
    pub contact_limiter: Arc<RateLimiter>,
    /// Throttles login attempts. Independent of `contact_limiter`.
    pub login_limiter: Arc<RateLimiter>,
    pub store: Arc<dyn ContentStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Builds the admission gates from config. Any invalid setting fails here,
    /// before the server binds.
    pub fn new(
        config: ServerConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn ContentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> CoreResult<Self> {
        let authenticator = config.auth.build()?;
        let contact_limiter = config.rate_limit.contact.build()?;
        let login_limiter = config.rate_limit.login.build()?;

        Ok(Self {
            config: Arc::new(config),
            clock,
            authenticator: Arc::new(authenticator),
            contact_limiter: Arc::new(contact_limiter),
            login_limiter: Arc::new(login_limiter),
            store,
            notifier,
        })
    }

    /// Record timestamp for the current clock reading.
    pub fn now(&self) -> Timestamp {
        timestamp(self.clock.unix_secs())
    }

    /// Drops rate-limit entries whose windows have fully expired.
    pub fn sweep_limiters(&self) -> usize {
        let now = self.clock.instant();
        self.contact_limiter.evict_idle(now) + self.login_limiter.evict_idle(now)
    }
}
