use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::{
    ensure_unique, impl_foreign_keys, impl_record, is_sentinel, list_populated, same_text,
    unused_name, DishRequirement, Entity, NavList, SupplierStock,
};
use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{Column, EntityKind, Table, Tables};
use crate::validation::validate_name;

/// A kind of supply (e.g. "Produce", "Dairy").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct SupplyCategory {
    #[serde(default)]
    pub id: i32,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub name: String,

    #[serde(default)]
    pub dish_requirements: NavList,

    #[serde(default)]
    pub supplier_stocks: NavList,

    #[serde(default)]
    pub supply_links: NavList,
}

impl_record!(SupplyCategory);
impl_foreign_keys!(SupplyCategory {});

impl Entity for SupplyCategory {
    const KIND: EntityKind = EntityKind::SupplyCategory;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.supply_categories
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.supply_categories
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if list_populated(&self.dish_requirements) {
            Some("DishRequirements")
        } else if list_populated(&self.supplier_stocks) {
            Some("SupplierStocks")
        } else if list_populated(&self.supply_links) {
            Some("SupplyLinks")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.dish_requirements = None;
        self.supplier_stocks = None;
        self.supply_links = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        ensure_unique(
            &tables.supply_categories,
            current,
            || format!("Supply category named '{}'", self.name),
            |row| same_text(&row.name, &self.name),
        )
    }

    fn blank(&mut self, templates: &BlankTemplates, tables: &Tables) {
        self.name = unused_name(
            &tables.supply_categories,
            self.id,
            &templates.supply_category_name,
            |row| row.name.as_str(),
        );
    }

    fn relocated(&mut self, from: i32, templates: &BlankTemplates, tables: &Tables) {
        if is_sentinel(&self.name, &templates.supply_category_name, from) {
            self.blank(templates, tables);
        }
    }

    fn view(&self, tables: &Tables) -> Result<Value, ServiceError> {
        let suppliers = tables
            .referencing::<SupplierStock>(Column::SupplyCategoryId, self.id)
            .count();
        let dishes = tables
            .referencing::<DishRequirement>(Column::SupplyCategoryId, self.id)
            .count();

        Ok(json!({
            "Id": self.id,
            "Name": self.name,
            "SupplierCount": suppliers,
            "DishCount": dishes,
        }))
    }
}
