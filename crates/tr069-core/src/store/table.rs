// ── Object tables ──
//
// Rows keyed by instance number, in creation order, with an alias index.
// The table is the enforcement point for invariants that span rows:
// alias uniqueness, `unique_keys()` tuples and the entry limit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ModelOptions;
use crate::error::{CoreError, FaultCode, ParameterFault, SetFault};
use crate::model::{Alias, InstanceNumber};
use crate::schema::validate::{Origin, stage};
use crate::schema::{self, ManagedEntity};

/// Rows that disappear on their own (expiry date, lease end).
pub trait Expiring {
    /// `None` (or the infinite-time sentinel) never expires.
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// A table of `T` rows.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: IndexMap<InstanceNumber, T>,
    aliases: HashMap<String, InstanceNumber>,
    next_instance: InstanceNumber,
    options: ModelOptions,
}

impl<T: ManagedEntity> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ManagedEntity> PartialEq for Table<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl<T: ManagedEntity> Table<T> {
    pub fn new() -> Self {
        Self::with_options(ModelOptions::default())
    }

    pub fn with_options(options: ModelOptions) -> Self {
        Self {
            rows: IndexMap::new(),
            aliases: HashMap::new(),
            next_instance: InstanceNumber::FIRST,
            options,
        }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Replace the options, e.g. after loading a persisted table.
    /// Existing rows are kept even if they exceed a new `max_entries`.
    pub fn set_options(&mut self, options: ModelOptions) {
        self.options = options;
    }

    /// Create a row, returning its instance number.
    ///
    /// A row without an alias gets a device-assigned one, `{prefix}{n}` or,
    /// if a controller already took that, `{prefix}{n}-{k}`. The row must pass
    /// field validation and must not clash with an existing alias or
    /// `unique_keys()` tuple.
    pub fn add(&mut self, mut row: T) -> Result<InstanceNumber, CoreError> {
        if let Some(max_entries) = self.options.max_entries {
            if self.rows.len() >= max_entries {
                return Err(CoreError::TableFull {
                    object: T::OBJECT_NAME,
                    max_entries,
                });
            }
        }

        let instance = self.next_instance;
        if row.alias().is_some_and(str::is_empty) {
            let alias = self.free_alias(instance)?;
            row.set_alias(alias.into());
        }

        let faults = schema::validate(&row);
        if !faults.is_empty() {
            return Err(SetFault::new(faults).into());
        }
        self.check_row(None, &row)?;

        if let Some(alias) = row.alias() {
            self.aliases.insert(alias.to_owned(), instance);
        }
        self.rows.insert(instance, row);
        self.next_instance = instance.next();

        tracing::debug!(object = T::OBJECT_NAME, %instance, "row added");
        Ok(instance)
    }

    /// Delete a row.
    pub fn remove(&mut self, instance: InstanceNumber) -> Result<T, CoreError> {
        let row = self
            .rows
            .shift_remove(&instance)
            .ok_or(CoreError::InstanceNotFound {
                object: T::OBJECT_NAME,
                instance,
            })?;
        if let Some(alias) = row.alias() {
            self.unindex_alias(alias, instance);
        }
        tracing::debug!(object = T::OBJECT_NAME, %instance, "row removed");
        Ok(row)
    }

    /// Delete every row matching `pred`, returning what was removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<(InstanceNumber, T)> {
        let doomed: Vec<InstanceNumber> = self
            .rows
            .iter()
            .filter(|(_, row)| pred(row))
            .map(|(instance, _)| *instance)
            .collect();
        doomed
            .into_iter()
            .filter_map(|instance| self.remove(instance).ok().map(|row| (instance, row)))
            .collect()
    }

    pub fn get(&self, instance: InstanceNumber) -> Option<&T> {
        self.rows.get(&instance)
    }

    pub fn get_by_alias(&self, alias: &str) -> Option<(InstanceNumber, &T)> {
        let instance = *self.aliases.get(alias)?;
        self.rows.get(&instance).map(|row| (instance, row))
    }

    /// Resolve an alias to its instance number.
    pub fn resolve(&self, alias: &str) -> Result<InstanceNumber, CoreError> {
        self.aliases
            .get(alias)
            .copied()
            .ok_or_else(|| CoreError::AliasNotFound {
                object: T::OBJECT_NAME,
                alias: alias.to_owned(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceNumber, &T)> {
        self.rows.iter().map(|(instance, row)| (*instance, row))
    }

    pub fn instance_numbers(&self) -> Vec<InstanceNumber> {
        self.rows.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Controller- or device-originated write to one row.
    ///
    /// Per-field validation first; then alias and uniqueness checks on the
    /// staged row. Fault parameter names are prefixed `{instance}.`.
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
        let current = self.get(instance).ok_or(CoreError::InstanceNotFound {
            object: T::OBJECT_NAME,
            instance,
        })?;
        let staged = stage(current, updates, origin)
            .map_err(|fault| prefix_faults(fault, instance))?;

        let requested: Vec<&str> = updates.iter().map(|(name, _)| name.as_ref()).collect();
        let faults = self.row_faults(instance, &staged, &requested);
        if !faults.is_empty() {
            return Err(prefix_faults(SetFault::new(faults), instance).into());
        }

        self.commit(instance, staged);
        Ok(())
    }

    /// Device-side mutation of a row through plain field access.
    ///
    /// The result still has to pass field validation and the table
    /// invariants; on failure the row is left untouched.
    pub fn update_with(
        &mut self,
        instance: InstanceNumber,
        f: impl FnOnce(&mut T),
    ) -> Result<(), CoreError> {
        let mut staged = self
            .get(instance)
            .ok_or(CoreError::InstanceNotFound {
                object: T::OBJECT_NAME,
                instance,
            })?
            .clone();
        f(&mut staged);

        let faults = schema::validate(&staged);
        if !faults.is_empty() {
            return Err(prefix_faults(SetFault::new(faults), instance).into());
        }
        self.check_row(Some(instance), &staged)?;
        self.commit(instance, staged);
        Ok(())
    }

    /// Wire names of every parameter under `prefix`, e.g.
    /// `Device.NAT.PortMapping.` → `Device.NAT.PortMapping.1.Enable`.
    pub fn parameter_names(&self, prefix: &str) -> Vec<String> {
        self.parameters(prefix).into_iter().map(|(name, _)| name).collect()
    }

    /// Full path → value text for every parameter of every row.
    pub fn parameters(&self, prefix: &str) -> Vec<(String, String)> {
        self.rows
            .iter()
            .flat_map(|(instance, row)| {
                schema::to_parameter_map(row)
                    .into_iter()
                    .map(move |(name, value)| (format!("{prefix}{instance}.{name}"), value))
            })
            .collect()
    }

    /// Alias and uniqueness faults of rows that break a table invariant,
    /// e.g. after loading a hand-edited table.
    pub fn invariant_violations(&self) -> Vec<(InstanceNumber, Vec<ParameterFault>)> {
        self.rows
            .iter()
            .filter_map(|(instance, row)| {
                let faults = self.row_faults(*instance, row, &[]);
                (!faults.is_empty()).then_some((*instance, faults))
            })
            .collect()
    }

    // ── Crate-internal access for precedence tables ──────────────────

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = (InstanceNumber, &mut T)> {
        self.rows.iter_mut().map(|(instance, row)| (*instance, row))
    }

    pub(crate) fn get_mut(&mut self, instance: InstanceNumber) -> Option<&mut T> {
        self.rows.get_mut(&instance)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn commit(&mut self, instance: InstanceNumber, row: T) {
        let Some(old) = self.rows.get(&instance).map(|slot| slot.alias().map(str::to_owned)) else {
            return;
        };
        if old.as_deref() != row.alias() {
            if let Some(old) = old.as_deref() {
                self.unindex_alias(old, instance);
            }
            if let Some(alias) = row.alias() {
                self.aliases.insert(alias.to_owned(), instance);
            }
        }
        if let Some(slot) = self.rows.get_mut(&instance) {
            *slot = row;
        }
        tracing::trace!(object = T::OBJECT_NAME, %instance, "row updated");
    }

    /// Drop `instance`'s claim on `alias`. In a loaded table another row may
    /// share the alias; the index then moves to it.
    fn unindex_alias(&mut self, alias: &str, instance: InstanceNumber) {
        if self.aliases.get(alias) != Some(&instance) {
            return;
        }
        self.aliases.remove(alias);
        let heir = self
            .rows
            .iter()
            .find(|(other, row)| **other != instance && row.alias() == Some(alias))
            .map(|(other, _)| *other);
        if let Some(heir) = heir {
            self.aliases.insert(alias.to_owned(), heir);
        }
    }

    fn free_alias(&self, instance: InstanceNumber) -> Result<Alias, CoreError> {
        let base = Alias::device_assigned(&self.options.alias_prefix, instance)?;
        if !self.alias_taken(None, base.as_str()) {
            return Ok(base);
        }
        let mut suffix = 1u32;
        loop {
            let candidate = Alias::new(format!("{base}-{suffix}"))?;
            if !self.alias_taken(None, candidate.as_str()) {
                return Ok(candidate);
            }
            suffix = suffix.saturating_add(1);
        }
    }

    /// Alias and uniqueness checks as a `CoreError`.
    fn check_row(&self, skip: Option<InstanceNumber>, row: &T) -> Result<(), CoreError> {
        if let Some(alias) = row.alias() {
            Alias::new(alias)?;
            if self.alias_taken(skip, alias) {
                return Err(CoreError::DuplicateAlias {
                    object: T::OBJECT_NAME,
                    alias: alias.to_owned(),
                });
            }
        }
        if let Some(tuple) = self.unique_violation(skip, row) {
            return Err(CoreError::UniqueConstraint {
                object: T::OBJECT_NAME,
                parameters: tuple.iter().map(|p| (*p).to_owned()).collect(),
            });
        }
        Ok(())
    }

    /// Alias and uniqueness checks as parameter faults.
    ///
    /// A violated tuple is reported on every tuple member named in
    /// `requested`; if the request named none of them, on the whole tuple.
    fn row_faults(&self, instance: InstanceNumber, row: &T, requested: &[&str]) -> Vec<ParameterFault> {
        let mut faults = Vec::new();

        if let Some(alias) = row.alias() {
            if let Err(e) = Alias::new(alias) {
                faults.push(ParameterFault::new("Alias", FaultCode::InvalidParameterValue, e.to_string()));
            } else if self.alias_taken(Some(instance), alias) {
                faults.push(ParameterFault::new(
                    "Alias",
                    FaultCode::InvalidParameterValue,
                    format!("alias '{alias}' is already in use"),
                ));
            }
        }

        for tuple in T::unique_keys() {
            if !self.tuple_clashes(Some(instance), row, tuple) {
                continue;
            }
            let touched: Vec<&str> = tuple
                .iter()
                .copied()
                .filter(|p| requested.contains(p))
                .collect();
            let offending = if touched.is_empty() { tuple.to_vec() } else { touched };
            let message = format!("({}) must be unique in the table", tuple.join(", "));
            faults.extend(
                offending
                    .into_iter()
                    .map(|p| ParameterFault::new(p, FaultCode::InvalidParameterValue, message.clone())),
            );
        }

        faults
    }

    fn alias_taken(&self, skip: Option<InstanceNumber>, alias: &str) -> bool {
        // Scan rows, not the index: a loaded table may hold duplicates.
        self.rows
            .iter()
            .any(|(instance, other)| Some(*instance) != skip && other.alias() == Some(alias))
    }

    fn unique_violation(&self, skip: Option<InstanceNumber>, row: &T) -> Option<&'static [&'static str]> {
        T::unique_keys()
            .iter()
            .copied()
            .find(|tuple| self.tuple_clashes(skip, row, tuple))
    }

    fn tuple_clashes(&self, skip: Option<InstanceNumber>, row: &T, tuple: &[&str]) -> bool {
        if !row.is_enabled() {
            return false;
        }
        self.rows
            .iter()
            .filter(|(instance, other)| Some(**instance) != skip && other.is_enabled())
            .any(|(_, other)| tuple.iter().all(|p| row.get(p) == other.get(p)))
    }

    /// Rebuild indexes from deserialized rows.
    fn from_rows(rows: IndexMap<InstanceNumber, T>, options: ModelOptions) -> Self {
        let aliases = rows
            .iter()
            .filter_map(|(instance, row)| row.alias().map(|a| (a.to_owned(), *instance)))
            .collect();
        let next_instance = rows
            .keys()
            .max()
            .map_or(InstanceNumber::FIRST, |n| n.next());
        Self {
            rows,
            aliases,
            next_instance,
            options,
        }
    }
}

impl<T: ManagedEntity + Expiring> Table<T> {
    /// Remove rows whose expiry time is at or before `now`.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> Vec<(InstanceNumber, T)> {
        let purged = self.remove_where(|row| row.is_expired(now));
        if !purged.is_empty() {
            tracing::debug!(object = T::OBJECT_NAME, count = purged.len(), "expired rows purged");
        }
        purged
    }
}

fn prefix_faults(mut fault: SetFault, instance: InstanceNumber) -> SetFault {
    for f in &mut fault.faults {
        f.parameter = format!("{instance}.{}", f.parameter);
    }
    fault
}

// ── Serde: tables travel as `{ "<instance>": { row } }` ────────────

impl<T: ManagedEntity> Serialize for Table<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'de, T: ManagedEntity> Deserialize<'de> for Table<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = IndexMap::<InstanceNumber, T>::deserialize(deserializer)?;
        Ok(Self::from_rows(rows, ModelOptions::default()))
    }
}
