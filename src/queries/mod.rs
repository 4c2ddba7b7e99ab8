/*!
 * List query resolution
 *
 * Every list endpoint runs its base collection (ascending id) through the
 * same pipeline:
 * 1. date range and text filter (both must pass)
 * 2. stable sort by the requested key, or by id
 * 3. paging
 */

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::errors::ServiceError;
use crate::store::Record;

mod fields;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Orders two rows on one field.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Per-entity field map consulted by [`resolve`].
pub trait QueryFields: Record {
    /// Query parameter carrying this entity's date option, if it has one.
    const DATE_PARAM: Option<&'static str> = None;

    /// Text fields searched by `filter=`.
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Comparator for a lowercase `sortby=` key.
    fn sort_key(_key: &str) -> Option<Comparator<Self>> {
        None
    }

    /// Value compared against the date option.
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Parsed list options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub desc: bool,
    pub before: bool,
    pub date: Option<NaiveDate>,
    pub page_size: Option<u64>,
    pub page_index: Option<u64>,
}

impl QueryOptions {
    /// Reads options from a query string map. Keys are case-insensitive.
    ///
    /// `date_param` names the entity's date option (`started`, `open`);
    /// a malformed date is rejected, a malformed number is ignored.
    pub fn from_params(
        params: &HashMap<String, String>,
        date_param: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let lookup = |key: &str| {
            params
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.trim())
        };
        let flag = |key: &str| lookup(key).is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let number = |key: &str| {
            lookup(key)
                .and_then(|v| v.parse::<i64>().ok())
                .map(i64::unsigned_abs)
        };

        let date = match date_param.and_then(|param| lookup(param).map(|v| (param, v))) {
            Some((param, raw)) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(
                |_| {
                    ServiceError::InvalidInput(format!(
                        "{} must be a date formatted yyyy-MM-dd, got '{}'",
                        param, raw
                    ))
                },
            )?),
            None => None,
        };

        Ok(Self {
            filter: lookup("filter")
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            sort_by: lookup("sortby")
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase),
            desc: flag("desc"),
            before: flag("before"),
            date,
            page_size: number("pgsz"),
            page_index: number("pgind"),
        })
    }

    /// Applies `size` as the page size when the request named none.
    pub fn with_default_page_size(mut self, size: Option<u64>) -> Self {
        if self.page_size.is_none() {
            self.page_size = size;
        }
        self
    }

    /// `(skip, take)` for the requested page, if paging was requested.
    pub fn window(&self) -> Option<(usize, usize)> {
        let size = self.page_size?;
        let index = self.page_index.unwrap_or(1).max(1);
        let skip = size.saturating_mul(index - 1);
        Some((
            usize::try_from(skip).unwrap_or(usize::MAX),
            usize::try_from(size).unwrap_or(usize::MAX),
        ))
    }
}

fn passes_date<T: QueryFields>(row: &T, options: &QueryOptions) -> bool {
    match (T::DATE_PARAM, options.date) {
        (Some(_), Some(bound)) => match row.date() {
            Some(date) if options.before => date < bound,
            Some(date) => date >= bound,
            None => false,
        },
        _ => true,
    }
}

/// Rows without searchable text are not subject to `filter=`.
fn passes_filter<T: QueryFields>(row: &T, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    let fields = row.search_fields();
    fields.is_empty()
        || fields
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

/// Filters, sorts and pages `rows`.
pub fn resolve<'a, T, I>(rows: I, options: &QueryOptions) -> Vec<T>
where
    T: QueryFields + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = options.filter.as_deref().map(str::to_lowercase);
    let mut matched: Vec<&T> = rows
        .into_iter()
        .filter(|row| passes_date(*row, options) && passes_filter(*row, needle.as_deref()))
        .collect();

    let comparator: Comparator<T> = match options.sort_by.as_deref() {
        Some(key) => T::sort_key(key).unwrap_or_else(|| {
            debug!(key, "unknown sort key; ordering by id");
            by_id::<T>
        }),
        None => by_id::<T>,
    };
    matched.sort_by(|a, b| {
        let order = comparator(a, b);
        let order = if options.desc { order.reverse() } else { order };
        order.then_with(|| a.id().cmp(&b.id()))
    });

    let page = matched.into_iter();
    match options.window() {
        Some((skip, take)) => page.skip(skip).take(take).cloned().collect(),
        None => page.cloned().collect(),
    }
}

fn by_id<T: Record>(a: &T, b: &T) -> Ordering {
    a.id().cmp(&b.id())
}

/// Case-insensitive text ordering for sort keys.
pub(crate) fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
