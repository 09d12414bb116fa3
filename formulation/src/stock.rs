//! Warehouse stock balances.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use rules::MaterialId;

/// Error types for stock lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StockError {
    /// Stock backend is not reachable
    #[error("Stock unavailable: {0}")]
    Unavailable(String),

    /// Query failed
    #[error("Stock query failed: {0}")]
    QueryFailed(String),
}

/// Read-only access to stock balances.
#[async_trait]
pub trait StockLookup: Send + Sync {
    /// Summed signed movement quantities per material.
    ///
    /// Materials without any movement may be absent from the result; callers
    /// treat them as a zero balance.
    async fn balances(
        &self,
        ids: &BTreeSet<MaterialId>,
    ) -> Result<HashMap<MaterialId, Decimal>, StockError>;
}

/// A signed stock movement: positive for receipts, negative for issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    pub nomenclature_id: MaterialId,
    pub qty: Decimal,
    pub document_datetime: DateTime<Utc>,
}

impl StockMove {
    pub fn new(nomenclature_id: MaterialId, qty: Decimal) -> Self {
        Self {
            nomenclature_id,
            qty,
            document_datetime: Utc::now(),
        }
    }
}

/// In-memory stock ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStock {
    moves: Arc<RwLock<Vec<StockMove>>>,
}

impl InMemoryStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a movement.
    pub async fn record(&self, movement: StockMove) {
        self.moves.write().await.push(movement);
    }

    /// Record a movement of `qty` for `id` dated now.
    pub async fn record_qty(&self, id: MaterialId, qty: Decimal) {
        self.record(StockMove::new(id, qty)).await;
    }

    /// Number of recorded movements.
    pub async fn len(&self) -> usize {
        self.moves.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.moves.read().await.is_empty()
    }
}

#[async_trait]
impl StockLookup for InMemoryStock {
    async fn balances(
        &self,
        ids: &BTreeSet<MaterialId>,
    ) -> Result<HashMap<MaterialId, Decimal>, StockError> {
        let moves = self.moves.read().await;
        let mut balances: HashMap<MaterialId, Decimal> = HashMap::new();

        for movement in moves.iter().filter(|m| ids.contains(&m.nomenclature_id)) {
            *balances.entry(movement.nomenclature_id).or_default() += movement.qty;
        }

        Ok(balances)
    }
}
