//! Bulk cart normalization.
//!
//! The cart API heals a legacy cart the first time its owner touches it.
//! Users who never come back keep their old shape forever; this command
//! walks every user and rewrites those carts up front.
//!
//! # Usage
//!
//! ```bash
//! ck-cli heal-carts --dry-run
//! ck-cli heal-carts --batch-size 1000
//! ```

use cartkeeper_core::cart::normalize_stored;
use cartkeeper_core::{CartOwner, CartStore, StorageError, UserId};
use cartkeeper_storefront::db::{self, UserRepository};

use super::{CommandError, storefront_database_url};

/// Totals from a healing run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HealReport {
    /// Users examined.
    pub scanned: u64,
    /// Users whose cart was (or, in a dry run, would be) rewritten.
    pub healed: u64,
    /// Legacy carts left alone because they changed after being read.
    pub skipped: u64,
}

impl HealReport {
    fn absorb(&mut self, batch: Self) {
        self.scanned += batch.scanned;
        self.healed += batch.healed;
        self.skipped += batch.skipped;
    }
}

/// Normalize every stored cart, saving the ones that changed.
///
/// Each write only lands if the cart still holds the value read for this
/// batch, so a live request that touches the cart in between always wins.
///
/// # Errors
///
/// Returns `CommandError` if the batch size is not positive, the database
/// is unreachable, or a read or write fails. Batches already written stay
/// written.
pub async fn heal_carts(dry_run: bool, batch_size: i64) -> Result<HealReport, CommandError> {
    if batch_size <= 0 {
        return Err(CommandError::InvalidArgument(format!(
            "batch size must be positive (got {batch_size})"
        )));
    }

    let database_url = storefront_database_url()?;
    let pool = db::create_pool(&database_url).await?;
    let users = UserRepository::new(pool);

    let mut report = HealReport::default();
    let mut after: Option<UserId> = None;

    loop {
        let owners = users.list_cart_owners(after, batch_size).await?;
        let Some(last) = owners.last() else {
            break;
        };
        after = Some(last.id);

        report.absorb(heal_batch(&users, &owners, dry_run).await?);
        tracing::debug!(scanned = report.scanned, healed = report.healed, "Batch done");
    }

    Ok(report)
}

/// Heal one batch of owners against `store`.
async fn heal_batch(
    store: &dyn CartStore,
    owners: &[CartOwner],
    dry_run: bool,
) -> Result<HealReport, StorageError> {
    let mut report = HealReport {
        scanned: owners.len() as u64,
        ..HealReport::default()
    };

    for owner in owners {
        let normalized = normalize_stored(&owner.cart_items);
        if !normalized.healed {
            continue;
        }
        let lines = normalized.cart.len();

        if dry_run {
            report.healed += 1;
            tracing::info!(user_id = %owner.id, lines, "Would heal cart");
            continue;
        }

        if store
            .replace_cart(owner.id, &owner.cart_items, &normalized.cart)
            .await?
        {
            report.healed += 1;
            tracing::debug!(user_id = %owner.id, lines, "Healed cart");
        } else {
            report.skipped += 1;
            tracing::info!(user_id = %owner.id, "Cart changed since it was read, skipped");
        }
    }

    Ok(report)
}
