//! Dense table: row `n` always lives at slot `n - 1`, so live ids are `1..=len`.

/// A row with a 1-based surrogate key.
pub trait Record: Clone {
    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
}

/// Physical effect of removing a row from a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The last row was dropped.
    Truncated,
    /// The last row (`from`) now lives under `into`.
    Relocated { from: i32, into: i32 },
}

#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row count as a key; also the id of the last row.
    pub fn count(&self) -> i32 {
        i32::try_from(self.rows.len()).unwrap_or(i32::MAX)
    }

    fn slot(&self, id: i32) -> Option<usize> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        (index < self.rows.len()).then_some(index)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: i32) -> Option<&T> {
        self.slot(id).map(|index| &self.rows[index])
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut T> {
        let index = self.slot(id)?;
        Some(&mut self.rows[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.rows.iter_mut()
    }

    /// Appends `row` under `count + 1` and returns that id.
    pub fn push(&mut self, mut row: T) -> i32 {
        let id = self.count() + 1;
        row.set_id(id);
        self.rows.push(row);
        id
    }

    /// Overwrites the row at `id`, keeping the id. Returns false if absent.
    pub fn replace(&mut self, id: i32, mut row: T) -> bool {
        match self.slot(id) {
            Some(index) => {
                row.set_id(id);
                self.rows[index] = row;
                true
            }
            None => false,
        }
    }

    /// Removes `id` by moving the last row into its slot.
    ///
    /// Callers must migrate references to `from` when the result is
    /// [`Removal::Relocated`].
    pub fn compact_remove(&mut self, id: i32) -> Option<(T, Removal)> {
        let index = self.slot(id)?;
        let last = self.count();
        let removed = self.rows.swap_remove(index);
        if id == last {
            return Some((removed, Removal::Truncated));
        }
        self.rows[index].set_id(id);
        Some((removed, Removal::Relocated { from: last, into: id }))
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
