//! Referenced-only lookup tables, seeded from configuration at startup.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_unique, impl_foreign_keys, impl_record, same_text, unused_name, Entity};
use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{EntityKind, Table, Tables};
use crate::validation::validate_name;

macro_rules! lookup_entity {
    ($(#[$meta:meta])* $ty:ident, $kind:ident, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
        #[serde(rename_all = "PascalCase")]
        pub struct $ty {
            #[serde(default)]
            pub id: i32,

            #[validate(length(min = 1, max = 50), custom = "validate_name")]
            pub name: String,
        }

        impl $ty {
            pub fn named(name: impl Into<String>) -> Self {
                Self {
                    id: 0,
                    name: name.into(),
                }
            }
        }

        impl_record!($ty);
        impl_foreign_keys!($ty {});

        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn table(tables: &Tables) -> &Table<Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                &mut tables.$field
            }

            fn populated_navigation(&self) -> Option<&'static str> {
                None
            }

            fn clear_navigation(&mut self) {}

            fn check_constraints(
                &self,
                tables: &Tables,
                current: Option<i32>,
            ) -> Result<(), ServiceError> {
                ensure_unique(
                    &tables.$field,
                    current,
                    || format!("{} named '{}'", EntityKind::$kind, self.name),
                    |row| same_text(&row.name, &self.name),
                )
            }

            fn blank(&mut self, templates: &BlankTemplates, tables: &Tables) {
                self.name = unused_name(&tables.$field, self.id, &templates.placeholder_text, |row| {
                    row.name.as_str()
                });
            }
        }
    };
}

lookup_entity!(
    /// A menu of dishes; locations serve exactly one.
    Menu,
    Menu,
    menus
);
lookup_entity!(
    /// Opening hours pattern assigned to a location.
    Schedule,
    Schedule,
    schedules
);
lookup_entity!(
    /// Job title held by an employee.
    Position,
    Position,
    positions
);
