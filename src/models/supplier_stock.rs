use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_unique, impl_foreign_keys, impl_record, ref_populated, Entity, NavRef};
use crate::errors::ServiceError;
use crate::store::{EntityKind, Table, Tables};

/// A supply category a supplier carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SupplierStock {
    #[serde(default)]
    pub id: i32,

    #[validate(range(min = 1))]
    pub supplier_id: i32,

    #[validate(range(min = 1))]
    pub supply_category_id: i32,

    #[serde(default)]
    pub supplier: NavRef,

    #[serde(default)]
    pub supply_category: NavRef,
}

impl_record!(SupplierStock);
impl_foreign_keys!(SupplierStock {
    SupplierId => supplier_id,
    SupplyCategoryId => supply_category_id,
});

impl Entity for SupplierStock {
    const KIND: EntityKind = EntityKind::SupplierStock;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.supplier_stocks
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.supplier_stocks
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if ref_populated(&self.supplier) {
            Some("Supplier")
        } else if ref_populated(&self.supply_category) {
            Some("SupplyCategory")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.supplier = None;
        self.supply_category = None;
    }

    /// Beyond pair uniqueness, an update may not move a stock away from a
    /// pair that supply links still rely on. Deleting the stock is allowed
    /// and leaves those links in place.
    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        if let Some(old) = current.and_then(|id| tables.supplier_stocks.get(id)) {
            let repointed = old.supplier_id != self.supplier_id
                || old.supply_category_id != self.supply_category_id;
            if repointed
                && tables.supply_links.iter().any(|link| {
                    link.supplier_id == old.supplier_id
                        && link.supply_category_id == old.supply_category_id
                })
            {
                return Err(ServiceError::InvalidInput(format!(
                    "Supply links still rely on supplier {} stocking category {}",
                    old.supplier_id, old.supply_category_id
                )));
            }
        }
        ensure_unique(
            &tables.supplier_stocks,
            current,
            || {
                format!(
                    "Stock of category {} at supplier {}",
                    self.supply_category_id, self.supplier_id
                )
            },
            |row| {
                row.supplier_id == self.supplier_id
                    && row.supply_category_id == self.supply_category_id
            },
        )
    }
}
