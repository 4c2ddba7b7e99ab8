use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_unique, impl_foreign_keys, impl_record, ref_populated, Entity, NavRef};
use crate::errors::ServiceError;
use crate::store::{EntityKind, Table, Tables};

/// A supplier delivering one supply category to one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SupplyLink {
    #[serde(default)]
    pub id: i32,

    #[validate(range(min = 1))]
    pub location_id: i32,

    #[validate(range(min = 1))]
    pub supplier_id: i32,

    #[validate(range(min = 1))]
    pub supply_category_id: i32,

    #[serde(default)]
    pub location: NavRef,

    #[serde(default)]
    pub supplier: NavRef,

    #[serde(default)]
    pub supply_category: NavRef,
}

impl_record!(SupplyLink);
impl_foreign_keys!(SupplyLink {
    LocationId => location_id,
    SupplierId => supplier_id,
    SupplyCategoryId => supply_category_id,
});

impl Entity for SupplyLink {
    const KIND: EntityKind = EntityKind::SupplyLink;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.supply_links
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.supply_links
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if ref_populated(&self.location) {
            Some("Location")
        } else if ref_populated(&self.supplier) {
            Some("Supplier")
        } else if ref_populated(&self.supply_category) {
            Some("SupplyCategory")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.location = None;
        self.supplier = None;
        self.supply_category = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        let stocked = tables.supplier_stocks.iter().any(|stock| {
            stock.supplier_id == self.supplier_id
                && stock.supply_category_id == self.supply_category_id
        });
        if !stocked {
            return Err(ServiceError::InvalidInput(format!(
                "Supplier {} does not stock supply category {}",
                self.supplier_id, self.supply_category_id
            )));
        }

        ensure_unique(
            &tables.supply_links,
            current,
            || {
                format!(
                    "Supply link of category {} from supplier {} to location {}",
                    self.supply_category_id, self.supplier_id, self.location_id
                )
            },
            |row| {
                row.location_id == self.location_id
                    && row.supplier_id == self.supplier_id
                    && row.supply_category_id == self.supply_category_id
            },
        )
    }
}
