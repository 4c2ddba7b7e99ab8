//! Relation Graph: the static set of foreign-key edges between entity types.
//!
//! Forward edges (`references_from`) drive reference checks on writes.
//! Reverse edges (`dependents_of`) drive the "has dependents" test and the
//! reference migration performed by compaction.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Location,
    Employee,
    Management,
    Dish,
    MenuItem,
    DishRequirement,
    Supplier,
    SupplyCategory,
    SupplierStock,
    SupplyLink,
    Menu,
    Schedule,
    Position,
}

impl EntityKind {
    pub const ALL: [EntityKind; 13] = [
        EntityKind::Location,
        EntityKind::Employee,
        EntityKind::Management,
        EntityKind::Dish,
        EntityKind::MenuItem,
        EntityKind::DishRequirement,
        EntityKind::Supplier,
        EntityKind::SupplyCategory,
        EntityKind::SupplierStock,
        EntityKind::SupplyLink,
        EntityKind::Menu,
        EntityKind::Schedule,
        EntityKind::Position,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Location => "Location",
            EntityKind::Employee => "Employee",
            EntityKind::Management => "Management",
            EntityKind::Dish => "Dish",
            EntityKind::MenuItem => "MenuItem",
            EntityKind::DishRequirement => "DishRequirement",
            EntityKind::Supplier => "Supplier",
            EntityKind::SupplyCategory => "SupplyCategory",
            EntityKind::SupplierStock => "SupplierStock",
            EntityKind::SupplyLink => "SupplyLink",
            EntityKind::Menu => "Menu",
            EntityKind::Schedule => "Schedule",
            EntityKind::Position => "Position",
        }
    }

    /// True for pure join types: nothing can point at them.
    pub fn is_leaf(self) -> bool {
        dependents_of(self).next().is_none()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Foreign-key columns. Several entity types share a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    LocationId,
    ManagerId,
    MenuId,
    ScheduleId,
    PositionId,
    DishId,
    SupplierId,
    SupplyCategoryId,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::LocationId => "LocationId",
            Column::ManagerId => "ManagerId",
            Column::MenuId => "MenuId",
            Column::ScheduleId => "ScheduleId",
            Column::PositionId => "PositionId",
            Column::DishId => "DishId",
            Column::SupplierId => "SupplierId",
            Column::SupplyCategoryId => "SupplyCategoryId",
        }
    }
}

/// `owner.column` holds an id of `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub owner: EntityKind,
    pub column: Column,
    pub target: EntityKind,
}

const fn fk(owner: EntityKind, column: Column, target: EntityKind) -> ForeignKey {
    ForeignKey {
        owner,
        column,
        target,
    }
}

pub static RELATIONS: &[ForeignKey] = &[
    fk(EntityKind::Location, Column::MenuId, EntityKind::Menu),
    fk(EntityKind::Location, Column::ScheduleId, EntityKind::Schedule),
    fk(EntityKind::Employee, Column::LocationId, EntityKind::Location),
    fk(EntityKind::Employee, Column::PositionId, EntityKind::Position),
    fk(EntityKind::Management, Column::LocationId, EntityKind::Location),
    fk(EntityKind::Management, Column::ManagerId, EntityKind::Employee),
    fk(EntityKind::MenuItem, Column::MenuId, EntityKind::Menu),
    fk(EntityKind::MenuItem, Column::DishId, EntityKind::Dish),
    fk(EntityKind::DishRequirement, Column::DishId, EntityKind::Dish),
    fk(
        EntityKind::DishRequirement,
        Column::SupplyCategoryId,
        EntityKind::SupplyCategory,
    ),
    fk(EntityKind::SupplierStock, Column::SupplierId, EntityKind::Supplier),
    fk(
        EntityKind::SupplierStock,
        Column::SupplyCategoryId,
        EntityKind::SupplyCategory,
    ),
    fk(EntityKind::SupplyLink, Column::LocationId, EntityKind::Location),
    fk(EntityKind::SupplyLink, Column::SupplierId, EntityKind::Supplier),
    fk(
        EntityKind::SupplyLink,
        Column::SupplyCategoryId,
        EntityKind::SupplyCategory,
    ),
];

/// Edges leaving `owner` (the keys a row of that type holds).
pub fn references_from(owner: EntityKind) -> impl Iterator<Item = &'static ForeignKey> {
    RELATIONS.iter().filter(move |edge| edge.owner == owner)
}

/// Edges arriving at `target` (who can point at a row of that type).
pub fn dependents_of(target: EntityKind) -> impl Iterator<Item = &'static ForeignKey> {
    RELATIONS.iter().filter(move |edge| edge.target == target)
}

/// Read and rewrite access to a row's foreign-key columns.
pub trait ForeignKeys {
    fn foreign_key(&self, column: Column) -> Option<i32>;
    fn foreign_key_mut(&mut self, column: Column) -> Option<&mut i32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_types_are_leaves() {
        for kind in [
            EntityKind::Management,
            EntityKind::MenuItem,
            EntityKind::DishRequirement,
            EntityKind::SupplierStock,
            EntityKind::SupplyLink,
        ] {
            assert!(kind.is_leaf(), "{kind} should have no dependents");
        }
    }

    #[test]
    fn parent_types_have_dependents() {
        for kind in [
            EntityKind::Location,
            EntityKind::Employee,
            EntityKind::Dish,
            EntityKind::Supplier,
            EntityKind::SupplyCategory,
            EntityKind::Menu,
            EntityKind::Schedule,
            EntityKind::Position,
        ] {
            assert!(!kind.is_leaf(), "{kind} should have dependents");
        }
    }

    #[test]
    fn supply_category_is_referenced_by_three_join_tables() {
        let owners: Vec<_> = dependents_of(EntityKind::SupplyCategory)
            .map(|edge| edge.owner)
            .collect();
        assert_eq!(
            owners,
            vec![
                EntityKind::DishRequirement,
                EntityKind::SupplierStock,
                EntityKind::SupplyLink
            ]
        );
    }

    #[test]
    fn supply_link_references_three_parents() {
        let targets: Vec<_> = references_from(EntityKind::SupplyLink)
            .map(|edge| edge.target)
            .collect();
        assert_eq!(
            targets,
            vec![
                EntityKind::Location,
                EntityKind::Supplier,
                EntityKind::SupplyCategory
            ]
        );
    }

    #[test]
    fn every_kind_has_a_name() {
        for kind in EntityKind::ALL {
            assert!(!kind.name().is_empty());
        }
    }
}
