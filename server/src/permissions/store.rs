//! Hot-swappable authorizer.
//!
//! Requests take a snapshot with [`AuthorizerStore::current`] and answer every
//! question from it; a concurrent [`AuthorizerStore::replace`] never changes a
//! snapshot already handed out.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::engine::Authorizer;
use super::error::RuleError;
use super::rules::RuleTable;

/// Shared handle to the active [`Authorizer`].
#[derive(Debug)]
pub struct AuthorizerStore {
    active: ArcSwap<Authorizer>,
}

impl AuthorizerStore {
    #[must_use]
    pub fn new(authorizer: Authorizer) -> Self {
        Self {
            active: ArcSwap::from_pointee(authorizer),
        }
    }

    #[must_use]
    pub fn from_table(rules: RuleTable) -> Self {
        Self::new(Authorizer::new(rules))
    }

    /// Snapshot of the authorizer in effect right now.
    #[must_use]
    pub fn current(&self) -> Arc<Authorizer> {
        self.active.load_full()
    }

    /// Validate `rules` and make them active.
    ///
    /// On error the previous table stays in effect.
    pub fn replace(&self, rules: RuleTable, strict: bool) -> Result<(), RuleError> {
        let rules = rules.validated(strict)?;
        self.active.store(Arc::new(Authorizer::new(rules)));
        info!("Authorization rules replaced");
        Ok(())
    }
}

impl Default for AuthorizerStore {
    fn default() -> Self {
        Self::new(Authorizer::default())
    }
}
