use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_unique, impl_foreign_keys, impl_record, ref_populated, Entity, NavRef};
use crate::errors::ServiceError;
use crate::store::{EntityKind, Table, Tables};

/// Pairs a location with the employee who manages it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Management {
    #[serde(default)]
    pub id: i32,

    #[validate(range(min = 1))]
    pub location_id: i32,

    #[validate(range(min = 1))]
    pub manager_id: i32,

    #[serde(default)]
    pub location: NavRef,

    #[serde(default)]
    pub manager: NavRef,
}

impl_record!(Management);
impl_foreign_keys!(Management {
    LocationId => location_id,
    ManagerId => manager_id,
});

impl Entity for Management {
    const KIND: EntityKind = EntityKind::Management;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.managements
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.managements
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if ref_populated(&self.location) {
            Some("Location")
        } else if ref_populated(&self.manager) {
            Some("Manager")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.location = None;
        self.manager = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        ensure_unique(
            &tables.managements,
            current,
            || format!("Management for location {}", self.location_id),
            |row| row.location_id == self.location_id,
        )?;
        ensure_unique(
            &tables.managements,
            current,
            || format!("Management by employee {}", self.manager_id),
            |row| row.manager_id == self.manager_id,
        )
    }
}
