//! Filter/sort maps for each entity.

use chrono::NaiveDate;

use super::{text_order, Comparator, QueryFields};
use crate::models::{
    Dish, DishRequirement, Employee, Location, Management, Menu, MenuItem, Position, Schedule,
    Supplier, SupplierStock, SupplyCategory, SupplyLink,
};

impl QueryFields for Location {
    const DATE_PARAM: Option<&'static str> = Some("open");

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.country.as_str(),
            self.state.as_str(),
            self.city.as_str(),
            self.street.as_str(),
            self.country_code.as_str(),
            self.state_code.as_str(),
        ]
    }

    fn sort_key(key: &str) -> Option<Comparator<Self>> {
        match key {
            "country" => Some(|a: &Self, b: &Self| text_order(&a.country, &b.country)),
            "state" => Some(|a: &Self, b: &Self| text_order(&a.state, &b.state)),
            "city" => Some(|a: &Self, b: &Self| text_order(&a.city, &b.city)),
            "street" => Some(|a: &Self, b: &Self| text_order(&a.street, &b.street)),
            "open" => Some(|a: &Self, b: &Self| a.open_since.cmp(&b.open_since)),
            _ => None,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.open_since)
    }
}

impl QueryFields for Employee {
    const DATE_PARAM: Option<&'static str> = Some("started");

    fn search_fields(&self) -> Vec<&str> {
        vec![self.first_name.as_str(), self.last_name.as_str()]
    }

    fn sort_key(key: &str) -> Option<Comparator<Self>> {
        match key {
            "first" => Some(|a: &Self, b: &Self| text_order(&a.first_name, &b.first_name)),
            "last" => Some(|a: &Self, b: &Self| text_order(&a.last_name, &b.last_name)),
            "name" => Some(|a: &Self, b: &Self| {
                text_order(&a.last_name, &b.last_name)
                    .then_with(|| text_order(&a.first_name, &b.first_name))
            }),
            "hours" => Some(|a: &Self, b: &Self| a.weekly_hours.cmp(&b.weekly_hours)),
            "started" => Some(|a: &Self, b: &Self| a.started_on.cmp(&b.started_on)),
            _ => None,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.started_on)
    }
}

impl QueryFields for Supplier {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.country.as_str(),
            self.state.as_str(),
            self.city.as_str(),
            self.street.as_str(),
        ]
    }

    fn sort_key(key: &str) -> Option<Comparator<Self>> {
        match key {
            "name" => Some(|a: &Self, b: &Self| text_order(&a.name, &b.name)),
            "country" => Some(|a: &Self, b: &Self| text_order(&a.country, &b.country)),
            "state" => Some(|a: &Self, b: &Self| text_order(&a.state, &b.state)),
            "city" => Some(|a: &Self, b: &Self| text_order(&a.city, &b.city)),
            _ => None,
        }
    }
}

/// Entities searched and sorted on `Name` only.
macro_rules! named_fields {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl QueryFields for $ty {
                fn search_fields(&self) -> Vec<&str> {
                    vec![self.name.as_str()]
                }

                fn sort_key(key: &str) -> Option<Comparator<Self>> {
                    match key {
                        "name" => Some(|a: &Self, b: &Self| text_order(&a.name, &b.name)),
                        _ => None,
                    }
                }
            }
        )+
    };
}

named_fields!(Dish, SupplyCategory, Menu, Schedule, Position);

/// Join entities sort on their key columns.
macro_rules! key_fields {
    ($ty:ty { $($key:literal => $field:ident),+ $(,)? }) => {
        impl QueryFields for $ty {
            fn sort_key(key: &str) -> Option<Comparator<Self>> {
                match key {
                    $($key => Some(|a: &Self, b: &Self| a.$field.cmp(&b.$field)),)+
                    _ => None,
                }
            }
        }
    };
}

key_fields!(Management {
    "locationid" => location_id,
    "managerid" => manager_id,
});
key_fields!(MenuItem {
    "menuid" => menu_id,
    "dishid" => dish_id,
});
key_fields!(DishRequirement {
    "dishid" => dish_id,
    "supplycategoryid" => supply_category_id,
});
key_fields!(SupplierStock {
    "supplierid" => supplier_id,
    "supplycategoryid" => supply_category_id,
});
key_fields!(SupplyLink {
    "locationid" => location_id,
    "supplierid" => supplier_id,
    "supplycategoryid" => supply_category_id,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{resolve, QueryOptions};

    fn link(id: i32, location_id: i32, supplier_id: i32) -> SupplyLink {
        SupplyLink {
            id,
            location_id,
            supplier_id,
            supply_category_id: 1,
            location: None,
            supplier: None,
            supply_category: None,
        }
    }

    #[test]
    fn join_rows_sort_on_key_columns() {
        let rows = vec![link(1, 3, 1), link(2, 1, 2), link(3, 2, 2)];
        let options = QueryOptions {
            sort_by: Some("locationid".into()),
            ..Default::default()
        };
        let sorted: Vec<i32> = resolve(&rows, &options).iter().map(|l| l.id).collect();
        assert_eq!(sorted, vec![2, 3, 1]);
    }

    #[test]
    fn join_rows_ignore_text_filter_fields() {
        let rows = vec![link(1, 1, 1)];
        assert!(rows[0].search_fields().is_empty());
        assert!(SupplyLink::sort_key("name").is_none());
    }
}
