/*!
 * Compacting entity store
 *
 * Every table keeps its live ids dense (`1..=count`). Deletes either:
 * - blank the row in place when anything still references it,
 * - drop it when it is the last row, or
 * - move the last row into the freed slot and rewrite every foreign key
 *   that pointed at the moved row's old id.
 *
 * Writes run inside [`Store::transaction`]: the closure works on a staged
 * copy of all tables that replaces the live copy only on success.
 */

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::config::{BlankTemplates, SeedConfig};
use crate::errors::ServiceError;
use crate::models::{
    same_text, Dish, DishRequirement, Employee, Entity, Location, Management, Menu, MenuItem, Position,
    Schedule, Supplier, SupplierStock, SupplyCategory, SupplyLink,
};

pub mod relations;
pub mod table;

pub use relations::{dependents_of, references_from, Column, EntityKind, ForeignKey, ForeignKeys};
pub use table::{Record, Removal, Table};

/// What a delete physically did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome")]
pub enum DeleteOutcome {
    /// Row had dependents and was overwritten with sentinel content.
    Blanked,
    /// Row was the last one and was dropped.
    Removed,
    /// Last row `moved_from` now lives at the deleted id; `migrated`
    /// foreign keys were rewritten to follow it.
    Compacted { moved_from: i32, migrated: usize },
}

/// Every table of the chain.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub locations: Table<Location>,
    pub employees: Table<Employee>,
    pub managements: Table<Management>,
    pub dishes: Table<Dish>,
    pub menu_items: Table<MenuItem>,
    pub dish_requirements: Table<DishRequirement>,
    pub suppliers: Table<Supplier>,
    pub supply_categories: Table<SupplyCategory>,
    pub supplier_stocks: Table<SupplierStock>,
    pub supply_links: Table<SupplyLink>,
    pub menus: Table<Menu>,
    pub schedules: Table<Schedule>,
    pub positions: Table<Position>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live row count of `kind`.
    pub fn count(&self, kind: EntityKind) -> i32 {
        match kind {
            EntityKind::Location => self.locations.count(),
            EntityKind::Employee => self.employees.count(),
            EntityKind::Management => self.managements.count(),
            EntityKind::Dish => self.dishes.count(),
            EntityKind::MenuItem => self.menu_items.count(),
            EntityKind::DishRequirement => self.dish_requirements.count(),
            EntityKind::Supplier => self.suppliers.count(),
            EntityKind::SupplyCategory => self.supply_categories.count(),
            EntityKind::SupplierStock => self.supplier_stocks.count(),
            EntityKind::SupplyLink => self.supply_links.count(),
            EntityKind::Menu => self.menus.count(),
            EntityKind::Schedule => self.schedules.count(),
            EntityKind::Position => self.positions.count(),
        }
    }

    /// Ids are dense, so liveness is a range check.
    pub fn contains(&self, kind: EntityKind, id: i32) -> bool {
        id >= 1 && id <= self.count(kind)
    }

    fn rows(&self, kind: EntityKind) -> Box<dyn Iterator<Item = &dyn ForeignKeys> + '_> {
        fn erase<T: ForeignKeys + Record>(
            table: &Table<T>,
        ) -> Box<dyn Iterator<Item = &dyn ForeignKeys> + '_> {
            Box::new(table.iter().map(|row| row as &dyn ForeignKeys))
        }

        match kind {
            EntityKind::Location => erase(&self.locations),
            EntityKind::Employee => erase(&self.employees),
            EntityKind::Management => erase(&self.managements),
            EntityKind::Dish => erase(&self.dishes),
            EntityKind::MenuItem => erase(&self.menu_items),
            EntityKind::DishRequirement => erase(&self.dish_requirements),
            EntityKind::Supplier => erase(&self.suppliers),
            EntityKind::SupplyCategory => erase(&self.supply_categories),
            EntityKind::SupplierStock => erase(&self.supplier_stocks),
            EntityKind::SupplyLink => erase(&self.supply_links),
            EntityKind::Menu => erase(&self.menus),
            EntityKind::Schedule => erase(&self.schedules),
            EntityKind::Position => erase(&self.positions),
        }
    }

    fn rows_mut(&mut self, kind: EntityKind) -> Box<dyn Iterator<Item = &mut dyn ForeignKeys> + '_> {
        fn erase<T: ForeignKeys + Record>(
            table: &mut Table<T>,
        ) -> Box<dyn Iterator<Item = &mut dyn ForeignKeys> + '_> {
            Box::new(table.iter_mut().map(|row| row as &mut dyn ForeignKeys))
        }

        match kind {
            EntityKind::Location => erase(&mut self.locations),
            EntityKind::Employee => erase(&mut self.employees),
            EntityKind::Management => erase(&mut self.managements),
            EntityKind::Dish => erase(&mut self.dishes),
            EntityKind::MenuItem => erase(&mut self.menu_items),
            EntityKind::DishRequirement => erase(&mut self.dish_requirements),
            EntityKind::Supplier => erase(&mut self.suppliers),
            EntityKind::SupplyCategory => erase(&mut self.supply_categories),
            EntityKind::SupplierStock => erase(&mut self.supplier_stocks),
            EntityKind::SupplyLink => erase(&mut self.supply_links),
            EntityKind::Menu => erase(&mut self.menus),
            EntityKind::Schedule => erase(&mut self.schedules),
            EntityKind::Position => erase(&mut self.positions),
        }
    }

    /// Rows of `E` whose `column` equals `id`.
    pub fn referencing<E: Entity>(&self, column: Column, id: i32) -> impl Iterator<Item = &E> + '_ {
        E::table(self)
            .iter()
            .filter(move |row| row.foreign_key(column) == Some(id))
    }

    /// Whether any row of any type holds a foreign key to `kind`/`id`.
    pub fn has_dependents(&self, kind: EntityKind, id: i32) -> bool {
        dependents_of(kind).any(|edge| {
            self.rows(edge.owner)
                .any(|row| row.foreign_key(edge.column) == Some(id))
        })
    }

    /// Rewrites every foreign key to `kind`/`from` so that it reads `into`.
    pub fn migrate_references(&mut self, kind: EntityKind, from: i32, into: i32) -> usize {
        let mut migrated = 0;
        for edge in dependents_of(kind) {
            for row in self.rows_mut(edge.owner) {
                if let Some(value) = row.foreign_key_mut(edge.column) {
                    if *value == from {
                        *value = into;
                        migrated += 1;
                    }
                }
            }
        }
        migrated
    }

    /// Every foreign key held by `row` must resolve to a live row.
    pub fn check_references<E: Entity>(&self, row: &E) -> Result<(), ServiceError> {
        for edge in references_from(E::KIND) {
            if let Some(id) = row.foreign_key(edge.column) {
                if !self.contains(edge.target, id) {
                    return Err(ServiceError::unresolved_reference(
                        edge.column.name(),
                        edge.target,
                        id,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Shared payload checks for create and update.
    fn admit<E: Entity>(&self, row: &mut E, current: Option<i32>) -> Result<(), ServiceError> {
        if row.id() != 0 {
            return Err(ServiceError::InvalidInput(format!(
                "{} Id is assigned by the server and cannot be supplied",
                E::KIND
            )));
        }
        if let Some(field) = row.populated_navigation() {
            return Err(ServiceError::InvalidInput(format!(
                "{}.{} is read-only",
                E::KIND,
                field
            )));
        }
        row.validate()?;
        self.check_references(row)?;
        row.check_constraints(self, current)?;
        row.clear_navigation();
        Ok(())
    }

    /// Appends `row` under `count + 1`.
    pub fn create<E: Entity>(&mut self, mut row: E) -> Result<E, ServiceError> {
        self.admit(&mut row, None)?;
        let table = E::table_mut(self);
        let id = table.push(row);
        table
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::InternalError(format!("{} {} vanished", E::KIND, id)))
    }

    /// Replaces every mutable field of row `id`.
    pub fn update<E: Entity>(&mut self, id: i32, mut row: E) -> Result<E, ServiceError> {
        if !E::table(self).contains(id) {
            return Err(ServiceError::not_found(E::KIND, id));
        }
        self.admit(&mut row, Some(id))?;
        let table = E::table_mut(self);
        table.replace(id, row);
        table
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(E::KIND, id))
    }

    /// Blanks, drops or compacts row `id` depending on its dependents.
    pub fn delete<E: Entity>(
        &mut self,
        id: i32,
        templates: &BlankTemplates,
    ) -> Result<DeleteOutcome, ServiceError> {
        if !E::table(self).contains(id) {
            return Err(ServiceError::not_found(E::KIND, id));
        }

        if self.has_dependents(E::KIND, id) {
            let mut row = E::table(self)
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(E::KIND, id))?;
            row.blank(templates, self);
            E::table_mut(self).replace(id, row);
            return Ok(DeleteOutcome::Blanked);
        }

        match E::table_mut(self).compact_remove(id) {
            None => Err(ServiceError::not_found(E::KIND, id)),
            Some((_, Removal::Truncated)) => Ok(DeleteOutcome::Removed),
            Some((_, Removal::Relocated { from, into })) => {
                let migrated = self.migrate_references(E::KIND, from, into);
                if let Some(mut moved) = E::table(self).get(into).cloned() {
                    moved.relocated(from, templates, self);
                    E::table_mut(self).replace(into, moved);
                }
                Ok(DeleteOutcome::Compacted {
                    moved_from: from,
                    migrated,
                })
            }
        }
    }
}

/// Shared handle over [`Tables`] with single-writer transactions.
#[derive(Debug)]
pub struct Store {
    tables: RwLock<Tables>,
    blanks: BlankTemplates,
}

impl Store {
    pub fn new(blanks: BlankTemplates) -> Self {
        Self::with_tables(Tables::new(), blanks)
    }

    pub fn with_tables(tables: Tables, blanks: BlankTemplates) -> Self {
        Self {
            tables: RwLock::new(tables),
            blanks,
        }
    }

    pub fn blanks(&self) -> &BlankTemplates {
        &self.blanks
    }

    /// Runs `f` against a consistent snapshot.
    pub async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.read().await;
        f(&tables)
    }

    /// Runs `f` against a staged copy and commits it only when `f` succeeds.
    ///
    /// Readers never observe a half-applied write: the write lock is held
    /// for the whole closure and the swap happens at the end.
    ///
    /// The staged copy clones every table, so each write costs time and
    /// memory proportional to the whole store, not to the rows it touches.
    pub async fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut live = self.tables.write().await;
        let mut staged = live.clone();
        let result = f(&mut staged)?;
        *live = staged;
        Ok(result)
    }

    #[instrument(skip(self, row), fields(kind = %E::KIND))]
    pub async fn create<E: Entity>(&self, row: E) -> Result<E, ServiceError> {
        let created = self.transaction(|tables| tables.create(row)).await?;
        info!(id = created.id(), "{} created", E::KIND);
        Ok(created)
    }

    #[instrument(skip(self, row), fields(kind = %E::KIND))]
    pub async fn update<E: Entity>(&self, id: i32, row: E) -> Result<E, ServiceError> {
        let updated = self.transaction(|tables| tables.update(id, row)).await?;
        info!(id, "{} updated", E::KIND);
        Ok(updated)
    }

    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn delete<E: Entity>(&self, id: i32) -> Result<DeleteOutcome, ServiceError> {
        let blanks = &self.blanks;
        let outcome = self
            .transaction(|tables| tables.delete::<E>(id, blanks))
            .await?;
        match outcome {
            DeleteOutcome::Blanked => info!(id, "{} has dependents; blanked in place", E::KIND),
            DeleteOutcome::Removed => info!(id, "{} removed", E::KIND),
            DeleteOutcome::Compacted {
                moved_from,
                migrated,
            } => info!(
                id,
                moved_from, migrated, "{} removed; last row compacted into its slot", E::KIND
            ),
        }
        Ok(outcome)
    }

    /// Loads the lookup tables. Existing lookups are kept; only missing
    /// names are appended.
    pub async fn seed_lookups(&self, seed: &SeedConfig) -> Result<(), ServiceError> {
        self.transaction(|tables| {
            seed_names(tables, &seed.menus, |name| Menu::named(name), |row| row.name.as_str())?;
            seed_names(
                tables,
                &seed.schedules,
                |name| Schedule::named(name),
                |row| row.name.as_str(),
            )?;
            seed_names(
                tables,
                &seed.positions,
                |name| Position::named(name),
                |row| row.name.as_str(),
            )
        })
        .await?;
        info!(
            menus = seed.menus.len(),
            schedules = seed.schedules.len(),
            positions = seed.positions.len(),
            "lookup tables seeded"
        );
        Ok(())
    }
}

/// Creates one `E` per name not already present. Any other create failure
/// aborts the seed.
fn seed_names<E: Entity>(
    tables: &mut Tables,
    names: &[String],
    make: impl Fn(&str) -> E,
    name_of: impl Fn(&E) -> &str,
) -> Result<(), ServiceError> {
    for name in names {
        if E::table(tables)
            .iter()
            .any(|row| same_text(name_of(row), name))
        {
            debug!(%name, "{} already seeded", E::KIND);
            continue;
        }
        tables.create(make(name.as_str()))?;
    }
    Ok(())
}
