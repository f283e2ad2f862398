//! Multi-warehouse allocation planning (read-only).

use serde::{Deserialize, Serialize};

use logiflow_core::{ProductId, WarehouseId};

/// Quantity planned against one warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseAllocation {
    pub warehouse_id: WarehouseId,
    pub allocated_quantity: i64,
}

/// Plan for distributing a requested quantity across warehouses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub product_id: ProductId,
    pub requested_quantity: i64,
    pub allocations: Vec<WarehouseAllocation>,
    pub total_allocated: i64,
    pub shortage: i64,
    pub fully_allocated: bool,
}

/// Greedy accumulator: warehouses are offered in priority order and each one
/// covers as much of the remainder as its available stock allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    requested: i64,
    remaining: i64,
    allocations: Vec<WarehouseAllocation>,
}

impl AllocationPlan {
    pub fn new(requested: i64) -> Self {
        Self {
            requested,
            remaining: requested.max(0),
            allocations: Vec::new(),
        }
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn is_satisfied(&self) -> bool {
        self.remaining == 0
    }

    /// Whether `warehouse_id` already received an allocation.
    pub fn has_visited(&self, warehouse_id: &WarehouseId) -> bool {
        self.allocations
            .iter()
            .any(|a| &a.warehouse_id == warehouse_id)
    }

    /// Offer a warehouse with `available` units; returns the amount taken.
    ///
    /// Non-positive availability and repeated warehouses take nothing.
    pub fn offer(&mut self, warehouse_id: WarehouseId, available: i64) -> i64 {
        if self.is_satisfied() || available <= 0 || self.has_visited(&warehouse_id) {
            return 0;
        }
        let take = self.remaining.min(available);
        self.remaining -= take;
        self.allocations.push(WarehouseAllocation {
            warehouse_id,
            allocated_quantity: take,
        });
        take
    }

    pub fn allocations(&self) -> &[WarehouseAllocation] {
        &self.allocations
    }

    pub fn finish(self, product_id: ProductId) -> AllocationResult {
        let total_allocated: i64 = self.allocations.iter().map(|a| a.allocated_quantity).sum();
        let shortage = self.requested - total_allocated;
        AllocationResult {
            product_id,
            requested_quantity: self.requested,
            allocations: self.allocations,
            total_allocated,
            shortage,
            fully_allocated: shortage == 0,
        }
    }
}

/// Plan `total` over `(warehouse, available)` candidates in the given order.
///
/// Stops consuming candidates as soon as the request is covered.
pub fn plan_allocation<I>(total: i64, candidates: I) -> Vec<WarehouseAllocation>
where
    I: IntoIterator<Item = (WarehouseId, i64)>,
{
    let mut plan = AllocationPlan::new(total);
    for (warehouse_id, available) in candidates {
        if plan.is_satisfied() {
            break;
        }
        plan.offer(warehouse_id, available);
    }
    plan.allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fifty_units_over_thirty_and_forty() {
        let wh1 = WarehouseId::new();
        let wh2 = WarehouseId::new();

        let mut plan = AllocationPlan::new(50);
        plan.offer(wh1, 30);
        plan.offer(wh2, 40);
        let result = plan.finish(ProductId::new());

        assert_eq!(
            result.allocations,
            vec![
                WarehouseAllocation { warehouse_id: wh1, allocated_quantity: 30 },
                WarehouseAllocation { warehouse_id: wh2, allocated_quantity: 20 },
            ]
        );
        assert_eq!(result.shortage, 0);
        assert!(result.fully_allocated);
    }

    #[test]
    fn priority_order_is_not_resorted() {
        let small = WarehouseId::new();
        let large = WarehouseId::new();
        let allocations = plan_allocation(10, vec![(small, 3), (large, 100)]);
        assert_eq!(allocations[0].warehouse_id, small);
        assert_eq!(allocations[0].allocated_quantity, 3);
        assert_eq!(allocations[1].allocated_quantity, 7);
    }

    #[test]
    fn empty_warehouses_are_skipped_and_shortage_reported() {
        let wh1 = WarehouseId::new();
        let wh2 = WarehouseId::new();
        let mut plan = AllocationPlan::new(25);
        plan.offer(wh1, 0);
        plan.offer(wh2, 10);
        let result = plan.finish(ProductId::new());
        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.total_allocated, 10);
        assert_eq!(result.shortage, 15);
        assert!(!result.fully_allocated);
    }

    #[test]
    fn stops_consuming_candidates_once_satisfied() {
        let mut visited = 0;
        let candidates = (0..10).map(|_| {
            visited += 1;
            (WarehouseId::new(), 5)
        });
        let allocations = plan_allocation(10, candidates);
        assert_eq!(allocations.len(), 2);
        assert_eq!(visited, 3);
    }

    #[test]
    fn repeated_warehouse_is_counted_once() {
        let wh = WarehouseId::new();
        let allocations = plan_allocation(20, vec![(wh, 8), (wh, 8)]);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].allocated_quantity, 8);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the plan never exceeds the request or any warehouse's
        /// availability, follows input order, and a later warehouse is only
        /// used once every earlier one with stock is exhausted.
        #[test]
        fn allocation_respects_bounds_and_priority(
            total in 1i64..500,
            availability in prop::collection::vec(-5i64..120, 0..8)
        ) {
            let warehouses: Vec<(WarehouseId, i64)> = availability
                .iter()
                .map(|a| (WarehouseId::new(), *a))
                .collect();

            let allocations = plan_allocation(total, warehouses.clone());
            let sum: i64 = allocations.iter().map(|a| a.allocated_quantity).sum();
            prop_assert!(sum <= total);

            let mut last_index = None;
            for alloc in &allocations {
                let idx = warehouses
                    .iter()
                    .position(|(w, _)| *w == alloc.warehouse_id)
                    .unwrap();
                prop_assert!(alloc.allocated_quantity > 0);
                prop_assert!(alloc.allocated_quantity <= warehouses[idx].1);
                if let Some(prev) = last_index {
                    prop_assert!(idx > prev);
                }
                last_index = Some(idx);
            }

            // Every allocation but the last drains its warehouse completely.
            if allocations.len() > 1 {
                for alloc in &allocations[..allocations.len() - 1] {
                    let available = warehouses
                        .iter()
                        .find(|(w, _)| *w == alloc.warehouse_id)
                        .map(|(_, a)| *a)
                        .unwrap();
                    prop_assert_eq!(alloc.allocated_quantity, available);
                }
            }

            let total_positive: i64 = availability.iter().filter(|a| **a > 0).sum();
            prop_assert_eq!(sum, total.min(total_positive));
        }
    }
}
