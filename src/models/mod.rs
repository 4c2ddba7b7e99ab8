//! Entity row types.
//!
//! Every row carries a dense integer `Id`, its scalar fields, its foreign
//! keys and a set of navigation fields. Navigation fields are read-only
//! views; a payload that populates any of them is rejected.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::config::BlankTemplates;
use crate::errors::ServiceError;
use crate::store::{EntityKind, ForeignKeys, Record, Table, Tables};

pub mod dish;
pub mod dish_requirement;
pub mod employee;
pub mod location;
pub mod lookup;
pub mod management;
pub mod menu_item;
pub mod supplier;
pub mod supplier_stock;
pub mod supply_category;
pub mod supply_link;

pub use dish::Dish;
pub use dish_requirement::DishRequirement;
pub use employee::Employee;
pub use location::Location;
pub use lookup::{Menu, Position, Schedule};
pub use management::Management;
pub use menu_item::MenuItem;
pub use supplier::Supplier;
pub use supplier_stock::SupplierStock;
pub use supply_category::SupplyCategory;
pub use supply_link::SupplyLink;

/// Collection navigation field (`null`, `[]` or a populated array).
pub type NavList = Option<Vec<Value>>;
/// Single-valued navigation field.
pub type NavRef = Option<Value>;

pub(crate) fn list_populated(nav: &NavList) -> bool {
    nav.as_ref().is_some_and(|items| !items.is_empty())
}

pub(crate) fn ref_populated(nav: &NavRef) -> bool {
    nav.as_ref().is_some_and(|value| !value.is_null())
}

/// Behaviour shared by every stored entity type.
pub trait Entity:
    Record + ForeignKeys + Validate + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    /// JSON name of the first populated navigation field.
    fn populated_navigation(&self) -> Option<&'static str>;

    /// Resets navigation fields; the store never keeps client-supplied views.
    fn clear_navigation(&mut self);

    /// Uniqueness and cross-table rules. `current` is the id under update.
    fn check_constraints(&self, _tables: &Tables, _current: Option<i32>) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Overwrites the row with its sentinel content. Only reached for rows
    /// that still have dependents, so join types keep the no-op. `tables`
    /// still holds the row as it was before blanking.
    fn blank(&mut self, _templates: &BlankTemplates, _tables: &Tables) {}

    /// Compaction moved this row here from id `from`. Rows blanked under
    /// the old id re-render their id-derived sentinel content.
    fn relocated(&mut self, _from: i32, _templates: &BlankTemplates, _tables: &Tables) {}

    /// Shaped view served by `GET /{collection}/{id}`.
    fn view(&self, _tables: &Tables) -> Result<Value, ServiceError> {
        serde_json::to_value(self).map_err(|e| ServiceError::InternalError(e.to_string()))
    }
}

/// Rejects the write when another row already satisfies `clash`.
pub(crate) fn ensure_unique<E: Record>(
    table: &Table<E>,
    current: Option<i32>,
    what: impl FnOnce() -> String,
    clash: impl Fn(&E) -> bool,
) -> Result<(), ServiceError> {
    if table
        .iter()
        .any(|row| Some(row.id()) != current && clash(row))
    {
        Err(ServiceError::InvalidInput(format!("{} already exists", what())))
    } else {
        Ok(())
    }
}

pub(crate) fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Sentinel name for row `id`: `template` rendered for the id, suffixed
/// `-2`, `-3`, ... while another row of `table` already carries it.
pub(crate) fn unused_name<E: Record>(
    table: &Table<E>,
    id: i32,
    template: &str,
    name_of: impl Fn(&E) -> &str,
) -> String {
    let base = BlankTemplates::render(template, id);
    let taken = |candidate: &str| {
        table
            .iter()
            .any(|row| row.id() != id && same_text(name_of(row), candidate))
    };
    if !taken(base.as_str()) {
        return base;
    }
    let free = (2u32..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate.as_str()));
    free.unwrap_or(base)
}

/// Whether `name` is what [`unused_name`] produces for `template` and `id`.
/// Templates without `{id}` never need re-rendering and always answer false.
pub(crate) fn is_sentinel(name: &str, template: &str, id: i32) -> bool {
    if !template.contains("{id}") {
        return false;
    }
    let base = BlankTemplates::render(template, id);
    match name.strip_prefix(base.as_str()) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('-')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::store::Record for $ty {
                fn id(&self) -> i32 {
                    self.id
                }

                fn set_id(&mut self, id: i32) {
                    self.id = id;
                }
            }
        )+
    };
}

pub(crate) use impl_record;

macro_rules! impl_foreign_keys {
    ($ty:ident { $($column:ident => $field:ident),* $(,)? }) => {
        impl $crate::store::ForeignKeys for $ty {
            #[allow(unused_variables)]
            fn foreign_key(&self, column: $crate::store::Column) -> Option<i32> {
                match column {
                    $($crate::store::Column::$column => Some(self.$field),)*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn foreign_key_mut(&mut self, column: $crate::store::Column) -> Option<&mut i32> {
                match column {
                    $($crate::store::Column::$column => Some(&mut self.$field),)*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use impl_foreign_keys;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_navigation_is_not_populated() {
        assert!(!list_populated(&None));
        assert!(!list_populated(&Some(vec![])));
        assert!(list_populated(&Some(vec![json!({"Id": 1})])));
        assert!(!ref_populated(&None));
        assert!(!ref_populated(&Some(Value::Null)));
        assert!(ref_populated(&Some(json!({}))));
    }

    fn named(names: &[&str]) -> Table<crate::models::Dish> {
        let mut table = Table::default();
        for name in names {
            table.push(crate::models::Dish {
                id: 0,
                name: name.to_string(),
                menu_items: None,
                dish_requirements: None,
            });
        }
        table
    }

    #[test]
    fn sentinel_name_skips_taken_names() {
        let template = "Unknown Dish {id}";
        let table = named(&["Ramen", "unknown dish 1", "Unknown Dish 1-2"]);
        assert_eq!(unused_name(&table, 1, template, |d| d.name.as_str()), "Unknown Dish 1-3");
        // The row's own current name never counts as taken.
        let table = named(&["Unknown Dish 1", "Pho"]);
        assert_eq!(unused_name(&table, 1, template, |d| d.name.as_str()), "Unknown Dish 1");
    }

    #[test]
    fn sentinel_detection_accepts_suffixed_names_only() {
        let template = "Unknown Dish {id}";
        assert!(is_sentinel("Unknown Dish 3", template, 3));
        assert!(is_sentinel("Unknown Dish 3-2", template, 3));
        assert!(!is_sentinel("Unknown Dish 3", template, 1));
        assert!(!is_sentinel("Unknown Dish 30", template, 3));
        assert!(!is_sentinel("Unknown Dish 3-", template, 3));
        assert!(!is_sentinel("None", "None", 3));
    }

    #[test]
    fn text_comparison_ignores_case_and_padding() {
        assert!(same_text("Pad Thai", " pad thai "));
        assert!(!same_text("Pad Thai", "Pad See Ew"));
    }
}
