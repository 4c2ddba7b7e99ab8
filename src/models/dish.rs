use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::{
    ensure_unique, impl_foreign_keys, impl_record, is_sentinel, list_populated, same_text,
    unused_name, DishRequirement, Entity, MenuItem, NavList,
};
use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{Column, EntityKind, Table, Tables};
use crate::validation::validate_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Dish {
    #[serde(default)]
    pub id: i32,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub name: String,

    #[serde(default)]
    pub menu_items: NavList,

    #[serde(default)]
    pub dish_requirements: NavList,
}

impl_record!(Dish);
impl_foreign_keys!(Dish {});

impl Entity for Dish {
    const KIND: EntityKind = EntityKind::Dish;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.dishes
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.dishes
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if list_populated(&self.menu_items) {
            Some("MenuItems")
        } else if list_populated(&self.dish_requirements) {
            Some("DishRequirements")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.menu_items = None;
        self.dish_requirements = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        ensure_unique(
            &tables.dishes,
            current,
            || format!("Dish named '{}'", self.name),
            |row| same_text(&row.name, &self.name),
        )
    }

    fn blank(&mut self, templates: &BlankTemplates, tables: &Tables) {
        self.name = unused_name(&tables.dishes, self.id, &templates.dish_name, |row| {
            row.name.as_str()
        });
    }

    fn relocated(&mut self, from: i32, templates: &BlankTemplates, tables: &Tables) {
        if is_sentinel(&self.name, &templates.dish_name, from) {
            self.blank(templates, tables);
        }
    }

    fn view(&self, tables: &Tables) -> Result<Value, ServiceError> {
        let menus: Vec<_> = tables
            .referencing::<MenuItem>(Column::DishId, self.id)
            .filter_map(|item| tables.menus.get(item.menu_id))
            .map(|menu| menu.name.clone())
            .collect();
        let requires: Vec<_> = tables
            .referencing::<DishRequirement>(Column::DishId, self.id)
            .filter_map(|req| tables.supply_categories.get(req.supply_category_id))
            .map(|category| category.name.clone())
            .collect();

        Ok(json!({
            "Id": self.id,
            "Name": self.name,
            "Menus": menus,
            "Requires": requires,
        }))
    }
}
