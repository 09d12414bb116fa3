//! Availability resolution for one role.

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::debug;

use crate::stock::{StockError, StockLookup};
use rules::MaterialId;

/// The candidates whose stock balance is strictly positive.
///
/// Called once per role with the role's full candidate set. Candidates
/// without movements have a zero balance and are unavailable.
pub async fn resolve_available(
    candidates: &BTreeSet<MaterialId>,
    stock: &dyn StockLookup,
) -> Result<BTreeSet<MaterialId>, StockError> {
    if candidates.is_empty() {
        return Ok(BTreeSet::new());
    }

    let balances = stock.balances(candidates).await?;
    let available: BTreeSet<MaterialId> = candidates
        .iter()
        .filter(|id| balances.get(*id).is_some_and(|balance| *balance > Decimal::ZERO))
        .copied()
        .collect();

    debug!(
        candidates = candidates.len(),
        available = available.len(),
        "Resolved availability"
    );

    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::InMemoryStock;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_only_positive_balances_available() {
        let stock = InMemoryStock::new();
        let [positive, zero, negative, unknown] = [(); 4].map(|_| Uuid::new_v4());
        stock.record_qty(positive, Decimal::new(25, 1)).await;
        stock.record_qty(zero, Decimal::ZERO).await;
        stock.record_qty(negative, Decimal::from(-1)).await;

        let candidates = BTreeSet::from([positive, zero, negative, unknown]);
        let available = resolve_available(&candidates, &stock).await.unwrap();

        assert_eq!(available, BTreeSet::from([positive]));
    }

    #[tokio::test]
    async fn test_adding_stocked_candidate_never_shrinks() {
        let stock = InMemoryStock::new();
        let [a, b, c] = [(); 3].map(|_| Uuid::new_v4());
        stock.record_qty(a, Decimal::from(1)).await;
        stock.record_qty(c, Decimal::from(2)).await;

        let before = resolve_available(&BTreeSet::from([a, b]), &stock).await.unwrap();
        let after = resolve_available(&BTreeSet::from([a, b, c]), &stock).await.unwrap();

        assert!(before.is_subset(&after));
        assert!(after.contains(&c));
    }

    #[tokio::test]
    async fn test_empty_candidates_resolve_empty() {
        let stock = InMemoryStock::new();
        assert!(resolve_available(&BTreeSet::new(), &stock).await.unwrap().is_empty());
    }
}
