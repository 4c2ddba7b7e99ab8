use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_unique, impl_foreign_keys, impl_record, ref_populated, Entity, NavRef};
use crate::errors::ServiceError;
use crate::store::{EntityKind, Table, Tables};

/// A supply category a dish cannot be cooked without.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct DishRequirement {
    #[serde(default)]
    pub id: i32,

    #[validate(range(min = 1))]
    pub dish_id: i32,

    #[validate(range(min = 1))]
    pub supply_category_id: i32,

    #[serde(default)]
    pub dish: NavRef,

    #[serde(default)]
    pub supply_category: NavRef,
}

impl_record!(DishRequirement);
impl_foreign_keys!(DishRequirement {
    DishId => dish_id,
    SupplyCategoryId => supply_category_id,
});

impl Entity for DishRequirement {
    const KIND: EntityKind = EntityKind::DishRequirement;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.dish_requirements
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.dish_requirements
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if ref_populated(&self.dish) {
            Some("Dish")
        } else if ref_populated(&self.supply_category) {
            Some("SupplyCategory")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.dish = None;
        self.supply_category = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        ensure_unique(
            &tables.dish_requirements,
            current,
            || {
                format!(
                    "Requirement of category {} for dish {}",
                    self.supply_category_id, self.dish_id
                )
            },
            |row| row.dish_id == self.dish_id && row.supply_category_id == self.supply_category_id,
        )
    }
}
