// ── Precedence tables ──
//
// Tables whose rows carry a dense 1-based rank (`Order`, `PoolOrder`) and
// are evaluated first-match in ascending rank. Every mutation ends with the
// ranking dense again: a collision first shifts the colliding row and all
// rows ranked at or after it down by one, then the whole table is
// renumbered 1..=n.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ModelOptions;
use crate::error::CoreError;
use crate::matching::Matches;
use crate::model::InstanceNumber;
use crate::schema::{ManagedEntity, Origin};

use super::table::{Expiring, Table};

/// A row ranked within a precedence table.
pub trait Ordered: ManagedEntity {
    /// Wire name of the rank parameter.
    const ORDER_PARAM: &'static str;

    fn order(&self) -> u32;

    fn set_order(&mut self, order: u32);
}

/// A [`Table`] that keeps its rows densely ranked.
///
/// Dereferences to the inner table for read access; every write goes
/// through methods that restore the ranking.
#[derive(Debug, Clone)]
pub struct PrecedenceTable<T> {
    table: Table<T>,
}

impl<T: Ordered> Default for PrecedenceTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ordered> PartialEq for PrecedenceTable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl<T: Ordered> Deref for PrecedenceTable<T> {
    type Target = Table<T>;

    fn deref(&self) -> &Table<T> {
        &self.table
    }
}

impl<T: Ordered> PrecedenceTable<T> {
    pub fn new() -> Self {
        Self::with_options(ModelOptions::default())
    }

    pub fn with_options(options: ModelOptions) -> Self {
        Self {
            table: Table::with_options(options),
        }
    }

    pub fn set_options(&mut self, options: ModelOptions) {
        self.table.set_options(options);
    }

    /// Add a row at `requested` rank, or after the last row when `None`.
    pub fn insert(&mut self, mut row: T, requested: Option<u32>) -> Result<InstanceNumber, CoreError> {
        let order = match requested {
            Some(0) => return Err(invalid_order::<T>(0)),
            Some(order) => order,
            None => self.max_order().saturating_add(1),
        };
        row.set_order(order);
        let instance = self.table.add(row)?;
        self.settle(Some(instance));
        tracing::debug!(object = T::OBJECT_NAME, %instance, requested = order, "row ranked");
        Ok(instance)
    }

    /// Delete a row and close the gap it leaves.
    pub fn remove(&mut self, instance: InstanceNumber) -> Result<T, CoreError> {
        let row = self.table.remove(instance)?;
        self.settle(None);
        Ok(row)
    }

    /// Move a row to a new rank.
    pub fn reorder(&mut self, instance: InstanceNumber, order: u32) -> Result<(), CoreError> {
        if order == 0 {
            return Err(invalid_order::<T>(order));
        }
        let row = self.table.get_mut(instance).ok_or(CoreError::InstanceNotFound {
            object: T::OBJECT_NAME,
            instance,
        })?;
        row.set_order(order);
        self.settle(Some(instance));
        Ok(())
    }

    /// Validated write to one row; a new rank is settled like [`reorder`](Self::reorder).
    pub fn set_parameter_values<N, V>(
        &mut self,
        instance: InstanceNumber,
        updates: &[(N, V)],
        origin: Origin,
    ) -> Result<(), CoreError>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        self.table.set_parameter_values(instance, updates, origin)?;
        let moved = updates
            .iter()
            .any(|(name, _)| name.as_ref() == T::ORDER_PARAM)
            .then_some(instance);
        self.settle(moved);
        Ok(())
    }

    /// Device-side mutation; a changed rank is settled afterwards.
    pub fn update_with(
        &mut self,
        instance: InstanceNumber,
        f: impl FnOnce(&mut T),
    ) -> Result<(), CoreError> {
        let before = self.table.get(instance).map(T::order);
        self.table.update_with(instance, f)?;
        let after = self.table.get(instance).map(T::order);
        self.settle((before != after).then_some(instance));
        Ok(())
    }

    /// Delete every row matching `pred`.
    pub fn remove_where(&mut self, pred: impl FnMut(&T) -> bool) -> Vec<(InstanceNumber, T)> {
        let removed = self.table.remove_where(pred);
        if !removed.is_empty() {
            self.settle(None);
        }
        removed
    }

    /// Rows in evaluation order.
    pub fn by_order(&self) -> Vec<(InstanceNumber, &T)> {
        let mut rows: Vec<_> = self.table.iter().collect();
        rows.sort_by_key(|(_, row)| row.order());
        rows
    }

    /// First row, in evaluation order, satisfying `pred`.
    pub fn first_match(&self, mut pred: impl FnMut(&T) -> bool) -> Option<(InstanceNumber, &T)> {
        self.by_order().into_iter().find(|(_, row)| pred(row))
    }

    /// First row classifying `candidate`.
    pub fn first_match_for<C>(&self, candidate: &C) -> Option<(InstanceNumber, &T)>
    where
        T: Matches<C>,
    {
        self.first_match(|row| row.matches(candidate))
    }

    pub fn max_order(&self) -> u32 {
        self.table.iter().map(|(_, row)| row.order()).max().unwrap_or(0)
    }

    // ── Ranking ──────────────────────────────────────────────────────

    /// Resolve a collision caused by `moved`, then renumber densely.
    fn settle(&mut self, moved: Option<InstanceNumber>) {
        if let Some(moved) = moved {
            self.shift_colliders(moved);
        }
        self.compact();
    }

    fn shift_colliders(&mut self, moved: InstanceNumber) {
        let Some(target) = self.table.get(moved).map(T::order) else {
            return;
        };
        let collides = self
            .table
            .iter()
            .any(|(instance, row)| instance != moved && row.order() == target);
        if !collides {
            return;
        }
        for (instance, row) in self.table.rows_mut() {
            if instance != moved && row.order() >= target {
                row.set_order(row.order().saturating_add(1));
            }
        }
    }

    fn compact(&mut self) {
        // Ties (possible only in deserialized data) keep creation order.
        let mut ranked: Vec<(u32, usize, InstanceNumber)> = self
            .table
            .iter()
            .enumerate()
            .map(|(position, (instance, row))| (row.order(), position, instance))
            .collect();
        ranked.sort_unstable();

        for (rank, (_, _, instance)) in (1u32..).zip(ranked) {
            if let Some(row) = self.table.get_mut(instance) {
                if row.order() != rank {
                    tracing::trace!(object = T::OBJECT_NAME, %instance, from = row.order(), to = rank, "rank compacted");
                    row.set_order(rank);
                }
            }
        }
    }
}

impl<T: Ordered + Expiring> PrecedenceTable<T> {
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> Vec<(InstanceNumber, T)> {
        let purged = self.table.purge_expired(now);
        if !purged.is_empty() {
            self.settle(None);
        }
        purged
    }
}

fn invalid_order<T: Ordered>(value: u32) -> CoreError {
    CoreError::InvalidOrder {
        parameter: T::ORDER_PARAM,
        value,
    }
}

impl<T: Ordered> Serialize for PrecedenceTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.table.serialize(serializer)
    }
}

impl<'de, T: Ordered> Deserialize<'de> for PrecedenceTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut table = Self {
            table: Table::deserialize(deserializer)?,
        };
        table.compact();
        Ok(table)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::FirewallRule;

    fn rule(description: &str) -> FirewallRule {
        FirewallRule {
            description: description.into(),
            ..FirewallRule::default()
        }
    }

    fn sequence(table: &PrecedenceTable<FirewallRule>) -> Vec<(String, u32)> {
        table
            .by_order()
            .into_iter()
            .map(|(_, r)| (r.description.clone(), r.order))
            .collect()
    }

    fn abc() -> (PrecedenceTable<FirewallRule>, [InstanceNumber; 3]) {
        let mut table = PrecedenceTable::new();
        let a = table.insert(rule("a"), None).unwrap();
        let b = table.insert(rule("b"), None).unwrap();
        let c = table.insert(rule("c"), None).unwrap();
        (table, [a, b, c])
    }

    #[test]
    fn unrequested_rank_appends() {
        let (table, _) = abc();
        assert_eq!(
            sequence(&table),
            vec![("a".into(), 1), ("b".into(), 2), ("c".into(), 3)]
        );
    }

    #[test]
    fn requested_rank_beyond_end_is_compacted() {
        let (mut table, _) = abc();
        table.insert(rule("d"), Some(40)).unwrap();
        assert_eq!(table.by_order().last().unwrap().1.order, 4);
    }

    #[test]
    fn reorder_to_front_shifts_everyone() {
        let (mut table, [_, _, c]) = abc();
        table.reorder(c, 1).unwrap();
        assert_eq!(
            sequence(&table),
            vec![("c".into(), 1), ("a".into(), 2), ("b".into(), 3)]
        );
    }

    #[test]
    fn reorder_increments_before_compacting() {
        // a→3 collides with c; c shifts to 4, then the gap at 1 closes.
        let (mut table, [a, _, _]) = abc();
        table.reorder(a, 3).unwrap();
        assert_eq!(
            sequence(&table),
            vec![("b".into(), 1), ("a".into(), 2), ("c".into(), 3)]
        );
    }

    #[test]
    fn rank_zero_is_rejected() {
        let (mut table, [a, _, _]) = abc();
        assert!(matches!(
            table.insert(rule("z"), Some(0)),
            Err(CoreError::InvalidOrder { value: 0, .. })
        ));
        assert!(matches!(table.reorder(a, 0), Err(CoreError::InvalidOrder { .. })));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn controller_order_write_is_settled() {
        let (mut table, [_, b, _]) = abc();
        table
            .set_parameter_values(b, &[("Order", "1")], Origin::Controller)
            .unwrap();
        assert_eq!(
            sequence(&table),
            vec![("b".into(), 1), ("a".into(), 2), ("c".into(), 3)]
        );
    }
}
