use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::{
    ensure_unique, impl_foreign_keys, impl_record, is_sentinel, list_populated, same_text,
    unused_name, Entity, NavList, SupplierStock, SupplyLink,
};
use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{Column, EntityKind, Table, Tables};
use crate::validation::{validate_name, validate_not_blank, validate_region_code};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Supplier {
    #[serde(default)]
    pub id: i32,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub name: String,

    #[validate(custom = "validate_region_code")]
    pub country_code: String,

    #[validate(custom = "validate_region_code")]
    pub state_code: String,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub country: String,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub state: String,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub city: String,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub street: String,

    #[serde(default)]
    pub supplier_stocks: NavList,

    #[serde(default)]
    pub supply_links: NavList,
}

impl_record!(Supplier);
impl_foreign_keys!(Supplier {});

impl Entity for Supplier {
    const KIND: EntityKind = EntityKind::Supplier;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.suppliers
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.suppliers
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if list_populated(&self.supplier_stocks) {
            Some("SupplierStocks")
        } else if list_populated(&self.supply_links) {
            Some("SupplyLinks")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.supplier_stocks = None;
        self.supply_links = None;
    }

    fn check_constraints(&self, tables: &Tables, current: Option<i32>) -> Result<(), ServiceError> {
        ensure_unique(
            &tables.suppliers,
            current,
            || format!("Supplier named '{}'", self.name),
            |row| same_text(&row.name, &self.name),
        )
    }

    fn blank(&mut self, templates: &BlankTemplates, tables: &Tables) {
        self.name = unused_name(&tables.suppliers, self.id, &templates.supplier_name, |row| {
            row.name.as_str()
        });
        self.country_code = templates.placeholder_code.clone();
        self.state_code = templates.placeholder_code.clone();
        self.country = templates.placeholder_text.clone();
        self.state = templates.placeholder_text.clone();
        self.city = templates.placeholder_text.clone();
        self.street = templates.placeholder_text.clone();
    }

    fn relocated(&mut self, from: i32, templates: &BlankTemplates, tables: &Tables) {
        if is_sentinel(&self.name, &templates.supplier_name, from) {
            self.blank(templates, tables);
        }
    }

    fn view(&self, tables: &Tables) -> Result<Value, ServiceError> {
        let stocks: Vec<_> = tables
            .referencing::<SupplierStock>(Column::SupplierId, self.id)
            .filter_map(|stock| tables.supply_categories.get(stock.supply_category_id))
            .map(|category| category.name.clone())
            .collect();
        let supplies = tables
            .referencing::<SupplyLink>(Column::SupplierId, self.id)
            .map(|link| link.location_id)
            .collect::<std::collections::BTreeSet<_>>();

        Ok(json!({
            "Id": self.id,
            "Name": self.name,
            "Address": format!(
                "{}, {}, {} {}, {} ({})",
                self.street, self.city, self.state, self.state_code, self.country, self.country_code
            ),
            "Stocks": stocks,
            "SuppliedLocationIds": supplies,
        }))
    }
}
