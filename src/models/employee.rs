use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use super::{impl_foreign_keys, impl_record, ref_populated, Entity, Management, NavRef};
use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{Column, EntityKind, Table, Tables};
use crate::validation::{validate_name, validate_required_date, zero_date};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Employee {
    #[serde(default)]
    pub id: i32,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub first_name: String,

    #[validate(length(min = 1, max = 50), custom = "validate_name")]
    pub last_name: String,

    /// Contracted hours per week, at most 80.
    #[validate(range(min = 0, max = 80))]
    pub weekly_hours: i32,

    #[serde(default = "zero_date")]
    #[validate(custom = "validate_required_date")]
    pub started_on: NaiveDate,

    #[validate(range(min = 1))]
    pub location_id: i32,

    #[validate(range(min = 1))]
    pub position_id: i32,

    #[serde(default)]
    pub location: NavRef,

    #[serde(default)]
    pub position: NavRef,

    #[serde(default)]
    pub management: NavRef,
}

impl_record!(Employee);
impl_foreign_keys!(Employee {
    LocationId => location_id,
    PositionId => position_id,
});

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn table(tables: &Tables) -> &Table<Self> {
        &tables.employees
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.employees
    }

    fn populated_navigation(&self) -> Option<&'static str> {
        if ref_populated(&self.location) {
            Some("Location")
        } else if ref_populated(&self.position) {
            Some("Position")
        } else if ref_populated(&self.management) {
            Some("Management")
        } else {
            None
        }
    }

    fn clear_navigation(&mut self) {
        self.location = None;
        self.position = None;
        self.management = None;
    }

    /// The location key is kept: the row still belongs somewhere.
    fn blank(&mut self, templates: &BlankTemplates, _tables: &Tables) {
        self.first_name = templates.employee_first_name.clone();
        self.last_name = templates.employee_last_name.clone();
        self.weekly_hours = 0;
        self.started_on = zero_date();
        self.position_id = templates.default_position_id;
    }

    fn view(&self, tables: &Tables) -> Result<Value, ServiceError> {
        let manages = tables
            .referencing::<Management>(Column::ManagerId, self.id)
            .next()
            .map(|management| management.location_id);

        Ok(json!({
            "Id": self.id,
            "Name": self.full_name(),
            "WeeklyHours": self.weekly_hours,
            "StartedOn": self.started_on,
            "LocationId": self.location_id,
            "City": tables.locations.get(self.location_id).map(|l| l.city.clone()),
            "Position": tables.positions.get(self.position_id).map(|p| p.name.clone()),
            "ManagesLocationId": manages,
        }))
    }
}
