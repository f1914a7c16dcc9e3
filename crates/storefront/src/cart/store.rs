//! The cart store: in-memory line list, persistence, and remote mirroring.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bramble_core::{Price, ProductId, UserId};

use crate::cart::mirror::{CartMirror, RemoteCartMirror};
use crate::cart::storage::CartStorage;
use crate::fakestore::{ApiError, Product, RemoteCartEntry};

/// One product's entry in the cart.
///
/// `product` is the denormalized catalog snapshot captured at add-time; it
/// is `None` on placeholder lines reconstructed from the remote mirror and
/// not yet enriched from the catalog. `subtotal` is always
/// `snapshot price x quantity` (zero while the snapshot is missing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub subtotal: Price,
}

impl CartLine {
    /// Whether this line still lacks its product snapshot.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.product.is_none()
    }

    /// Recompute the subtotal from the stored snapshot price.
    fn recompute_subtotal(&mut self) {
        self.subtotal = self
            .product
            .as_ref()
            .map_or(Price::ZERO, |p| p.price.times(self.quantity));
    }
}

/// Hydration lifecycle of a [`CartStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartStatus {
    /// Created, not yet hydrated.
    Uninitialized,
    /// Hydration in flight; mutations are queued.
    Hydrating,
    /// Hydrated; mutations apply immediately.
    Ready,
}

/// Result of hydrating a store.
#[derive(Debug)]
pub enum HydrateOutcome {
    /// Hydration completed; any remote snapshot was reconciled.
    Ready,
    /// Hydration completed from local state only; the advisory remote
    /// fetch failed and the UI should show a transient notice.
    RemoteUnavailable(ApiError),
}

/// Result of a cart mutation.
///
/// Mutations never fail locally; the only error a caller can observe is an
/// advisory remote-sync failure, and local state has already been updated
/// and persisted by the time it is reported.
#[derive(Debug)]
pub enum MutationOutcome {
    /// Local state updated (and mirrored, where a user identity is bound).
    Applied,
    /// Local state updated; the advisory remote push failed.
    SyncFailed(ApiError),
    /// The store is still hydrating; the mutation was queued and will be
    /// replayed in arrival order once hydration completes.
    Deferred,
    /// Invalid input (zero/negative quantity, unknown product): silent no-op.
    Ignored,
}

impl MutationOutcome {
    /// The advisory sync failure, if any.
    #[must_use]
    pub fn sync_error(&self) -> Option<&ApiError> {
        match self {
            Self::SyncFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// A mutation that arrived while the store was still hydrating.
#[derive(Debug)]
enum PendingOp {
    Add { product: Product, quantity: u32 },
    UpdateQuantity { product_id: ProductId, quantity: u32 },
    Remove { product_id: ProductId },
    Clear,
}

/// The cart store.
///
/// Owns the in-memory line list for one session, keeps the persisted blob
/// in sync after every mutation, and mirrors adds to the remote cart
/// resource when a user identity is bound. Single-writer by construction:
/// one store is built per request and mutated on that request's task only.
pub struct CartStore<S, M> {
    storage: S,
    mirror: Option<(UserId, M)>,
    status: CartStatus,
    lines: Vec<CartLine>,
    pending: VecDeque<PendingOp>,
}

impl<S: CartStorage> CartStore<S, RemoteCartMirror> {
    /// Create a store for a guest session (no remote mirror).
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            mirror: None,
            status: CartStatus::Uninitialized,
            lines: Vec::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<S: CartStorage, M: CartMirror> CartStore<S, M> {
    /// Create a store bound to a user identity with a remote mirror.
    pub const fn with_mirror(storage: S, user_id: UserId, mirror: M) -> Self {
        Self {
            storage,
            mirror: Some((user_id, mirror)),
            status: CartStatus::Uninitialized,
            lines: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current hydration status.
    #[must_use]
    pub const fn status(&self) -> CartStatus {
        self.status
    }

    /// The cart lines in display (first-added) order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Total price across all line subtotals.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// Product IDs of lines still lacking a snapshot.
    #[must_use]
    pub fn placeholder_ids(&self) -> Vec<ProductId> {
        self.lines
            .iter()
            .filter(|l| l.is_placeholder())
            .map(|l| l.product_id)
            .collect()
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Hydrate the store from persisted local state and, when a user
    /// identity is bound, the remote cart snapshot.
    ///
    /// Idempotent: a second call on a hydrated store is a no-op. Storage
    /// read errors are logged and leave the store empty but usable; a
    /// remote fetch failure is advisory and reported in the outcome.
    pub async fn hydrate(&mut self) -> HydrateOutcome {
        if self.status != CartStatus::Uninitialized {
            return HydrateOutcome::Ready;
        }
        self.status = CartStatus::Hydrating;

        match self.storage.load().await {
            Ok(Some(lines)) => self.lines = dedupe_lines(lines),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
            }
        }

        let mut outcome = HydrateOutcome::Ready;
        if let Some((user_id, mirror)) = &self.mirror {
            match mirror.fetch(*user_id).await {
                Ok(entries) => self.reconcile_remote(&entries),
                Err(e) => {
                    warn!(error = %e, user_id = %user_id, "Remote cart fetch failed, using local state");
                    outcome = HydrateOutcome::RemoteUnavailable(e);
                }
            }
        }

        self.status = CartStatus::Ready;
        self.drain_pending().await;
        outcome
    }

    /// Reconcile the local line list against the remote snapshot.
    ///
    /// Local precedence, last write wins: each remote entry keeps the local
    /// line wholesale when one exists (its snapshot is the richer data) and
    /// becomes a placeholder line otherwise. There is no merging of
    /// concurrent edits.
    ///
    /// An empty remote entry list is read as "no remote cart" and keeps the
    /// local lines. The mirror only ever receives wholesale pushes of a
    /// non-empty local cart, so an empty remote body carries no intent to
    /// clear; clearing is a local operation.
    fn reconcile_remote(&mut self, entries: &[RemoteCartEntry]) {
        if entries.is_empty() {
            return;
        }

        let reconciled = entries
            .iter()
            .map(|entry| {
                self.lines
                    .iter()
                    .find(|l| l.product_id == entry.product_id)
                    .cloned()
                    .unwrap_or(CartLine {
                        product_id: entry.product_id,
                        quantity: entry.quantity.max(1),
                        product: None,
                        subtotal: Price::ZERO,
                    })
            })
            .collect();

        self.lines = reconciled;
    }

    /// Replay mutations that arrived during hydration, in arrival order.
    async fn drain_pending(&mut self) {
        while let Some(op) = self.pending.pop_front() {
            let outcome = match op {
                PendingOp::Add { product, quantity } => self.add_item(product, quantity).await,
                PendingOp::UpdateQuantity {
                    product_id,
                    quantity,
                } => self.update_quantity(product_id, quantity).await,
                PendingOp::Remove { product_id } => self.remove_item(product_id).await,
                PendingOp::Clear => self.clear().await,
            };
            if let Some(e) = outcome.sync_error() {
                warn!(error = %e, "Deferred cart mutation applied, remote sync failed");
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the cart.
    ///
    /// Merges by product ID: an existing line's quantity is incremented and
    /// its snapshot refreshed to the one passed in (which also enriches a
    /// placeholder line). The full line list is re-persisted, then pushed
    /// to the remote mirror best-effort.
    pub async fn add_item(&mut self, product: Product, quantity: u32) -> MutationOutcome {
        if self.status != CartStatus::Ready {
            self.pending.push_back(PendingOp::Add { product, quantity });
            return MutationOutcome::Deferred;
        }
        if quantity == 0 {
            return MutationOutcome::Ignored;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            // Saturate rather than wrap: a wrapped sum could land on 0 and a
            // line quantity must never drop below 1 except through removal
            line.quantity = line.quantity.saturating_add(quantity);
            line.product = Some(product);
            line.recompute_subtotal();
        } else {
            let mut line = CartLine {
                product_id: product.id,
                quantity,
                product: Some(product),
                subtotal: Price::ZERO,
            };
            line.recompute_subtotal();
            self.lines.push(line);
        }

        self.persist().await;
        self.push_mirror().await
    }

    /// Set a line's quantity.
    ///
    /// `quantity < 1` never removes the line; it is rejected as a silent
    /// no-op (removal only happens through [`Self::remove_item`]). The
    /// subtotal is recomputed from the stored snapshot price - the catalog
    /// is not re-queried.
    pub async fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> MutationOutcome {
        if self.status != CartStatus::Ready {
            self.pending.push_back(PendingOp::UpdateQuantity {
                product_id,
                quantity,
            });
            return MutationOutcome::Deferred;
        }
        if quantity < 1 {
            debug!(product_id = %product_id, "Ignoring quantity update below 1");
            return MutationOutcome::Ignored;
        }
        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return MutationOutcome::Ignored;
        };

        line.quantity = quantity;
        line.recompute_subtotal();

        self.persist().await;
        MutationOutcome::Applied
    }

    /// Remove a line. Unknown product IDs are a silent no-op.
    pub async fn remove_item(&mut self, product_id: ProductId) -> MutationOutcome {
        if self.status != CartStatus::Ready {
            self.pending.push_back(PendingOp::Remove { product_id });
            return MutationOutcome::Deferred;
        }
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return MutationOutcome::Ignored;
        }

        self.persist().await;
        MutationOutcome::Applied
    }

    /// Empty the cart and delete the persisted blob.
    pub async fn clear(&mut self) -> MutationOutcome {
        if self.status != CartStatus::Ready {
            self.pending.push_back(PendingOp::Clear);
            return MutationOutcome::Deferred;
        }
        self.lines.clear();
        if let Err(e) = self.storage.clear().await {
            warn!(error = %e, "Failed to delete persisted cart blob");
        }
        MutationOutcome::Applied
    }

    /// Enrich placeholder lines with catalog snapshots.
    ///
    /// Applies each product to the matching placeholder line, recomputes
    /// its subtotal, and re-persists once if anything changed. Lines that
    /// already carry a snapshot are left alone.
    pub async fn enrich(&mut self, products: impl IntoIterator<Item = Product>) {
        let mut changed = false;
        for product in products {
            if let Some(line) = self
                .lines
                .iter_mut()
                .find(|l| l.product_id == product.id && l.is_placeholder())
            {
                line.product = Some(product);
                line.recompute_subtotal();
                changed = true;
            }
        }
        if changed {
            self.persist().await;
        }
    }

    // =========================================================================
    // Persistence & mirroring
    // =========================================================================

    /// Overwrite the persisted blob with the current line list.
    ///
    /// Failures are logged only; in-memory state stays authoritative.
    async fn persist(&self) {
        if let Err(e) = self.storage.save(&self.lines).await {
            warn!(error = %e, "Failed to persist cart, in-memory state kept");
        }
    }

    /// Push the `{product_id, quantity}` projection to the remote mirror.
    ///
    /// Applied strictly after the local mutation so the visible cart always
    /// reflects the latest local intent; a failure is advisory.
    async fn push_mirror(&self) -> MutationOutcome {
        let Some((user_id, mirror)) = &self.mirror else {
            return MutationOutcome::Applied;
        };

        let entries: Vec<RemoteCartEntry> = self
            .lines
            .iter()
            .map(|l| RemoteCartEntry {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect();

        match mirror.push(*user_id, entries).await {
            Ok(()) => MutationOutcome::Applied,
            Err(e) => {
                warn!(error = %e, user_id = %user_id, "Remote cart push failed, local state kept");
                MutationOutcome::SyncFailed(e)
            }
        }
    }
}

/// Collapse duplicate product IDs from an untrusted persisted blob.
///
/// The store never writes duplicates, but the blob is client-adjacent state
/// and the no-two-lines-per-product invariant must hold after hydration.
fn dedupe_lines(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut out: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(existing) = out.iter_mut().find(|l| l.product_id == line.product_id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            if existing.product.is_none() {
                existing.product = line.product;
            }
            existing.recompute_subtotal();
        } else {
            out.push(line);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use bramble_core::Rating;

    use super::*;
    use crate::cart::storage::{MemoryCartStorage, StorageError};

    fn product(id: i64, price_cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(price_cents),
            description: String::new(),
            category: "test".to_string(),
            image: format!("https://example.com/{id}.jpg"),
            rating: Rating::default(),
        }
    }

    /// Mirror stub with a scripted remote snapshot and scripted push failures.
    #[derive(Default)]
    struct StubMirror {
        remote: Vec<RemoteCartEntry>,
        fail_fetch: bool,
        fail_push: bool,
        pushes: Mutex<Vec<Vec<RemoteCartEntry>>>,
    }

    impl CartMirror for StubMirror {
        async fn fetch(&self, _user_id: UserId) -> Result<Vec<RemoteCartEntry>, ApiError> {
            if self.fail_fetch {
                return Err(ApiError::Status {
                    status: 502,
                    body: "scripted fetch failure".to_string(),
                });
            }
            Ok(self.remote.clone())
        }

        async fn push(
            &self,
            _user_id: UserId,
            entries: Vec<RemoteCartEntry>,
        ) -> Result<(), ApiError> {
            if self.fail_push {
                return Err(ApiError::Status {
                    status: 502,
                    body: "scripted push failure".to_string(),
                });
            }
            self.pushes.lock().unwrap().push(entries);
            Ok(())
        }
    }

    /// Storage stub whose reads and writes always fail.
    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        async fn load(&self) -> Result<Option<Vec<CartLine>>, StorageError> {
            Err(StorageError::Backend("scripted load failure".to_string()))
        }

        async fn save(&self, _lines: &[CartLine]) -> Result<(), StorageError> {
            Err(StorageError::Backend("scripted save failure".to_string()))
        }

        async fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Backend("scripted clear failure".to_string()))
        }
    }

    async fn ready_guest_store() -> CartStore<MemoryCartStorage, RemoteCartMirror> {
        let mut store = CartStore::new(MemoryCartStorage::new());
        store.hydrate().await;
        store
    }

    #[tokio::test]
    async fn test_repeated_adds_merge_by_product_id() {
        let mut store = ready_guest_store().await;

        store.add_item(product(1, 1000), 1).await;
        store.add_item(product(1, 1000), 2).await;
        store.add_item(product(1, 1000), 4).await;

        assert_eq!(store.lines().len(), 1);
        let line = &store.lines()[0];
        assert_eq!(line.quantity, 7);
        assert_eq!(line.subtotal, Price::from_cents(7000));
    }

    #[tokio::test]
    async fn test_merged_quantity_saturates_at_max() {
        let mut store = ready_guest_store().await;

        store.add_item(product(1, 100), u32::MAX).await;
        store.add_item(product(1, 100), 1).await;

        // The merge must never wrap around to 0
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, u32::MAX);
        assert!(store.lines()[0].quantity >= 1);
    }

    #[tokio::test]
    async fn test_blob_dedup_saturates_at_max() {
        let dup = vec![
            CartLine {
                product_id: ProductId::new(1),
                quantity: u32::MAX,
                product: Some(product(1, 100)),
                subtotal: Price::from_cents(100).times(u32::MAX),
            },
            CartLine {
                product_id: ProductId::new(1),
                quantity: 5,
                product: None,
                subtotal: Price::ZERO,
            },
        ];
        let mut store = CartStore::new(MemoryCartStorage::seeded(dup));
        store.hydrate().await;

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, u32::MAX);
    }

    #[tokio::test]
    async fn test_add_zero_quantity_is_a_no_op() {
        let mut store = ready_guest_store().await;

        let outcome = store.add_item(product(1, 1000), 0).await;
        assert!(matches!(outcome, MutationOutcome::Ignored));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_below_one_never_changes_the_line() {
        let mut store = ready_guest_store().await;
        store.add_item(product(2, 500), 1).await;

        let outcome = store.update_quantity(ProductId::new(2), 0).await;
        assert!(matches!(outcome, MutationOutcome::Ignored));
        assert_eq!(store.lines()[0].quantity, 1);
        assert_eq!(store.lines()[0].subtotal, Price::from_cents(500));
    }

    #[tokio::test]
    async fn test_update_quantity_recomputes_subtotal_from_stored_price() {
        let mut store = ready_guest_store().await;
        store.add_item(product(1, 1099), 1).await;

        store.update_quantity(ProductId::new(1), 3).await;
        assert_eq!(store.lines()[0].subtotal, Price::from_cents(3297));
    }

    #[tokio::test]
    async fn test_remove_unknown_product_leaves_state_unchanged() {
        let mut store = ready_guest_store().await;
        store.add_item(product(1, 1000), 2).await;

        let outcome = store.remove_item(ProductId::new(99)).await;
        assert!(matches!(outcome, MutationOutcome::Ignored));
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.total_items(), 2);
    }

    #[tokio::test]
    async fn test_totals_always_equal_the_sums_over_lines() {
        let mut store = ready_guest_store().await;

        store.add_item(product(1, 1000), 2).await;
        store.add_item(product(2, 550), 3).await;
        store.update_quantity(ProductId::new(1), 5).await;
        store.remove_item(ProductId::new(2)).await;
        store.add_item(product(3, 125), 4).await;

        let expected_items: u32 = store.lines().iter().map(|l| l.quantity).sum();
        let expected_price: Price = store.lines().iter().map(|l| l.subtotal).sum();
        assert_eq!(store.total_items(), expected_items);
        assert_eq!(store.total_price(), expected_price);
        assert_eq!(store.total_items(), 9);
        assert_eq!(store.total_price(), Price::from_cents(5500));
    }

    #[tokio::test]
    async fn test_spec_scenario_add_merge_remove_update() {
        let mut store = ready_guest_store().await;
        let a = product(1, 1000); // $10.00
        let b = product(2, 500); // $5.00

        store.add_item(a.clone(), 1).await;
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.total_price(), Price::from_cents(1000));

        store.add_item(a, 2).await;
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, 3);
        assert_eq!(store.lines()[0].subtotal, Price::from_cents(3000));

        store.add_item(b, 1).await;
        assert_eq!(store.lines().len(), 2);
        assert_eq!(store.total_price(), Price::from_cents(3500));

        store.remove_item(ProductId::new(1)).await;
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].product_id, ProductId::new(2));
        assert_eq!(store.total_price(), Price::from_cents(500));

        store.update_quantity(ProductId::new(2), 0).await;
        assert_eq!(store.lines()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_display_order_is_first_added() {
        let mut store = ready_guest_store().await;
        store.add_item(product(3, 100), 1).await;
        store.add_item(product(1, 100), 1).await;
        store.add_item(product(3, 100), 1).await; // merge must not reorder
        store.add_item(product(2, 100), 1).await;

        let order: Vec<i64> = store.lines().iter().map(|l| l.product_id.as_i64()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_clear_then_fresh_hydration_is_empty() {
        let storage = MemoryCartStorage::new();
        let mut store = CartStore::new(storage);
        store.hydrate().await;
        store.add_item(product(1, 1000), 2).await;
        store.clear().await;
        assert!(store.is_empty());

        // A fresh session over the same (now deleted) blob hydrates empty
        let mut fresh = CartStore::new(MemoryCartStorage::new());
        fresh.hydrate().await;
        assert!(fresh.is_empty());
        assert_eq!(fresh.total_items(), 0);
    }

    #[tokio::test]
    async fn test_hydration_restores_persisted_lines() {
        let storage = MemoryCartStorage::new();
        let mut store = CartStore::new(storage);
        store.hydrate().await;
        store.add_item(product(1, 1000), 2).await;
        store.add_item(product(2, 500), 1).await;

        let blob = store.storage.load().await.unwrap().unwrap();
        let mut restored = CartStore::new(MemoryCartStorage::seeded(blob));
        restored.hydrate().await;
        assert_eq!(restored.lines().len(), 2);
        assert_eq!(restored.total_price(), Price::from_cents(2500));
    }

    #[tokio::test]
    async fn test_hydration_deduplicates_a_corrupted_blob() {
        let dup = vec![
            CartLine {
                product_id: ProductId::new(1),
                quantity: 1,
                product: Some(product(1, 1000)),
                subtotal: Price::from_cents(1000),
            },
            CartLine {
                product_id: ProductId::new(1),
                quantity: 2,
                product: None,
                subtotal: Price::ZERO,
            },
        ];
        let mut store = CartStore::new(MemoryCartStorage::seeded(dup));
        store.hydrate().await;

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, 3);
        assert_eq!(store.lines()[0].subtotal, Price::from_cents(3000));
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_store_usable() {
        let mut store = CartStore::with_mirror(
            BrokenStorage,
            UserId::new(1),
            StubMirror::default(),
        );
        store.hydrate().await;
        assert_eq!(store.status(), CartStatus::Ready);

        let outcome = store.add_item(product(1, 1000), 1).await;
        assert!(matches!(outcome, MutationOutcome::Applied));
        assert_eq!(store.total_items(), 1);
    }

    #[tokio::test]
    async fn test_remote_entries_become_placeholders_and_local_snapshot_wins() {
        // Local blob has a full snapshot for product 1 with quantity 2
        let local = vec![CartLine {
            product_id: ProductId::new(1),
            quantity: 2,
            product: Some(product(1, 1000)),
            subtotal: Price::from_cents(2000),
        }];
        let mirror = StubMirror {
            remote: vec![
                RemoteCartEntry {
                    product_id: ProductId::new(1),
                    quantity: 9, // stale remote quantity must not win
                },
                RemoteCartEntry {
                    product_id: ProductId::new(2),
                    quantity: 3,
                },
            ],
            ..StubMirror::default()
        };
        let mut store =
            CartStore::with_mirror(MemoryCartStorage::seeded(local), UserId::new(1), mirror);
        store.hydrate().await;

        assert_eq!(store.lines().len(), 2);
        let first = &store.lines()[0];
        assert_eq!(first.quantity, 2);
        assert!(!first.is_placeholder());
        assert_eq!(first.subtotal, Price::from_cents(2000));

        let second = &store.lines()[1];
        assert!(second.is_placeholder());
        assert_eq!(second.quantity, 3);
        assert_eq!(second.subtotal, Price::ZERO);
        assert_eq!(store.placeholder_ids(), vec![ProductId::new(2)]);

        // Placeholder subtotals contribute nothing until enriched
        assert_eq!(store.total_price(), Price::from_cents(2000));
    }

    #[tokio::test]
    async fn test_empty_remote_cart_keeps_local_lines() {
        let local = vec![CartLine {
            product_id: ProductId::new(1),
            quantity: 1,
            product: Some(product(1, 1000)),
            subtotal: Price::from_cents(1000),
        }];
        let mut store = CartStore::with_mirror(
            MemoryCartStorage::seeded(local),
            UserId::new(1),
            StubMirror::default(),
        );
        store.hydrate().await;

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.total_price(), Price::from_cents(1000));
    }

    #[tokio::test]
    async fn test_remote_fetch_failure_is_advisory() {
        let mirror = StubMirror {
            fail_fetch: true,
            ..StubMirror::default()
        };
        let mut store =
            CartStore::with_mirror(MemoryCartStorage::new(), UserId::new(1), mirror);

        let outcome = store.hydrate().await;
        assert!(matches!(outcome, HydrateOutcome::RemoteUnavailable(_)));
        assert_eq!(store.status(), CartStatus::Ready);
    }

    #[tokio::test]
    async fn test_add_pushes_projection_to_mirror() {
        let mut store = CartStore::with_mirror(
            MemoryCartStorage::new(),
            UserId::new(7),
            StubMirror::default(),
        );
        store.hydrate().await;
        store.add_item(product(1, 1000), 2).await;
        store.add_item(product(2, 500), 1).await;

        let (_, mirror) = store.mirror.as_ref().unwrap();
        let pushes = mirror.pushes.lock().unwrap();
        assert_eq!(pushes.len(), 2);
        assert_eq!(
            pushes[1],
            vec![
                RemoteCartEntry {
                    product_id: ProductId::new(1),
                    quantity: 2
                },
                RemoteCartEntry {
                    product_id: ProductId::new(2),
                    quantity: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_push_keeps_local_state_and_reports() {
        let mirror = StubMirror {
            fail_push: true,
            ..StubMirror::default()
        };
        let mut store =
            CartStore::with_mirror(MemoryCartStorage::new(), UserId::new(1), mirror);
        store.hydrate().await;

        let outcome = store.add_item(product(1, 1000), 1).await;
        assert!(outcome.sync_error().is_some());
        // Local mutation committed before the push was attempted
        assert_eq!(store.total_items(), 1);

        // And the blob was persisted too
        let blob = store.storage.load().await.unwrap().unwrap();
        assert_eq!(blob.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_before_ready_are_queued_and_replayed_in_order() {
        let mut store = CartStore::new(MemoryCartStorage::new());

        // Not hydrated yet: everything defers
        let outcome = store.add_item(product(1, 1000), 2).await;
        assert!(matches!(outcome, MutationOutcome::Deferred));
        let outcome = store.update_quantity(ProductId::new(1), 5).await;
        assert!(matches!(outcome, MutationOutcome::Deferred));
        let outcome = store.remove_item(ProductId::new(2)).await;
        assert!(matches!(outcome, MutationOutcome::Deferred));
        assert!(store.is_empty());

        store.hydrate().await;

        // Replayed in arrival order: add 2, set to 5, remove unknown
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, 5);
        assert_eq!(store.total_price(), Price::from_cents(5000));
    }

    #[tokio::test]
    async fn test_enrich_fills_placeholders_and_recomputes() {
        let mirror = StubMirror {
            remote: vec![RemoteCartEntry {
                product_id: ProductId::new(4),
                quantity: 2,
            }],
            ..StubMirror::default()
        };
        let mut store =
            CartStore::with_mirror(MemoryCartStorage::new(), UserId::new(1), mirror);
        store.hydrate().await;
        assert_eq!(store.placeholder_ids(), vec![ProductId::new(4)]);

        store.enrich([product(4, 750)]).await;

        assert!(store.placeholder_ids().is_empty());
        assert_eq!(store.lines()[0].subtotal, Price::from_cents(1500));
        assert_eq!(store.total_price(), Price::from_cents(1500));
    }

    #[tokio::test]
    async fn test_enrich_does_not_touch_full_lines() {
        let mut store = ready_guest_store().await;
        store.add_item(product(1, 1000), 1).await;

        // Same ID, different price: must not overwrite the captured snapshot
        store.enrich([product(1, 9999)]).await;
        assert_eq!(store.lines()[0].subtotal, Price::from_cents(1000));
    }
}
