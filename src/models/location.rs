use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::{impl_foreign_keys, impl_record, list_populated, ref_populated, Entity, NavList, NavRef};
use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{Column, EntityKind, Table, Tables};
use crate::validation::{
    validate_name, validate_not_blank, validate_region_code, validate_required_date, zero_date,
};

/// A restaurant of the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    #[serde(default)]
    pub id: i32,

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

    #[serde(default = "zero_date")]
    #[validate(custom = "validate_required_date")]
    pub open_since: NaiveDate,

    #[validate(range(min = 1))]
    pub menu_id: i32,

    #[validate(range(min = 1))]
    pub schedule_id: i32,

    #[serde(default)]
    pub employees: NavList,

    #[serde(default)]
    pub management: NavRef,

    #[serde(default)]
    pub supply_links: NavList,

    #[serde(default)]
    pub menu: NavRef,

    #[serde(default)]
    pub schedule: NavRef,
}

impl_record!(Location);
impl_foreign_keys!(Location {
    MenuId => menu_id,
    ScheduleId => schedule_id,
});

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.locations
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if list_populated(&self.employees) {
            Some("Employees")
        } else if ref_populated(&self.management) {
            Some("Management")
        } else if list_populated(&self.supply_links) {
            Some("SupplyLinks")
        } else if ref_populated(&self.menu) {
            Some("Menu")
        } else if ref_populated(&self.schedule) {
            Some("Schedule")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.employees = None;
        self.management = None;
        self.supply_links = None;
        self.menu = None;
        self.schedule = None;
    }

    fn blank(&mut self, templates: &BlankTemplates, _tables: &Tables) {
        self.country_code = templates.placeholder_code.clone();
        self.state_code = templates.placeholder_code.clone();
        self.country = templates.placeholder_text.clone();
        self.state = templates.placeholder_text.clone();
        self.city = templates.placeholder_text.clone();
        self.street = templates.placeholder_text.clone();
        self.open_since = zero_date();
        self.menu_id = templates.default_menu_id;
        self.schedule_id = templates.default_schedule_id;
    }

    fn view(&self, tables: &Tables) -> Result<Value, ServiceError> {
        let manager = tables
            .referencing::<crate::models::Management>(Column::LocationId, self.id)
            .next()
            .and_then(|management| tables.employees.get(management.manager_id))
            .map(|employee| employee.full_name());
        let employee_count = tables
            .referencing::<crate::models::Employee>(Column::LocationId, self.id)
            .count();
        let supplier_count = tables
            .referencing::<crate::models::SupplyLink>(Column::LocationId, self.id)
            .map(|link| link.supplier_id)
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        Ok(json!({
            "Id": self.id,
            "Address": self.address(),
            "OpenSince": self.open_since,
            "Menu": tables.menus.get(self.menu_id).map(|menu| menu.name.clone()),
            "Schedule": tables.schedules.get(self.schedule_id).map(|s| s.name.clone()),
            "Manager": manager,
            "EmployeeCount": employee_count,
            "SupplierCount": supplier_count,
            "Blanked": self.is_blank(),
        }))
    }
}

impl Location {
    /// Single-line postal address.
    pub fn address(&self) -> String {
        format!(
            "{}, {}, {} {}, {} ({})",
            self.street, self.city, self.state, self.state_code, self.country, self.country_code
        )
    }

    /// True once the row has been blanked in place.
    pub fn is_blank(&self) -> bool {
        self.open_since == zero_date()
    }
}
