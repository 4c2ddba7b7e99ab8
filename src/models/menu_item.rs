use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_unique, impl_foreign_keys, impl_record, ref_populated, Entity, NavRef};
use crate::errors::ServiceError;
use crate::store::{EntityKind, Table, Tables};

/// A dish offered on a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct MenuItem {
    #[serde(default)]
    pub id: i32,

    #[validate(range(min = 1))]
    pub menu_id: i32,

    #[validate(range(min = 1))]
    pub dish_id: i32,

    #[serde(default)]
    pub menu: NavRef,

    #[serde(default)]
    pub dish: NavRef,
}

impl_record!(MenuItem);
impl_foreign_keys!(MenuItem {
    MenuId => menu_id,
    DishId => dish_id,
});

impl Entity for MenuItem {
    const KIND: EntityKind = EntityKind::MenuItem;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.menu_items
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.menu_items
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if ref_populated(&self.menu) {
            Some("Menu")
        } else if ref_populated(&self.dish) {
            Some("Dish")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.menu = None;
        self.dish = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        ensure_unique(
            &tables.menu_items,
            current,
            || format!("Dish {} on menu {}", self.dish_id, self.menu_id),
            |row| row.menu_id == self.menu_id && row.dish_id == self.dish_id,
        )
    }
}
