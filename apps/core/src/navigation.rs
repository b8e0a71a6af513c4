use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DropdownState {
    Closed,
    /// Open-eligible but nothing to show; the overlay stays hidden.
    OpenEmpty,
    OpenWithItems {
        item_count: usize,
        selected: Option<usize>,
    },
}

/// A visible selection move. `previous` is the last index that was announced,
/// not necessarily the index selected right before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexChange {
    pub index: usize,
    pub previous: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionUpdate {
    Cleared,
    Moved(IndexChange),
}

/// Index tracking over the rendered item list.
///
/// `item_count` is `None` while no list is rendered at all, which differs from a
/// rendered list with zero items only in that commits and hovers have nothing to
/// resolve against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    item_count: Option<usize>,
    selected: Option<usize>,
    last_index: Option<usize>,
    hovered: Option<usize>,
}

impl Navigation {
    pub fn item_count(&self) -> usize {
        self.item_count.unwrap_or(0)
    }

    pub fn is_rendered(&self) -> bool {
        self.item_count.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Forgets the rendered list along with every index that referred to it.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Starts a render cycle over `count` items.
    pub fn load(&mut self, count: usize, select_first: bool) -> Option<SelectionUpdate> {
        self.item_count = Some(count);
        self.hovered = None;
        let reset = self.select(None);
        if select_first && count > 0 {
            return self.select(Some(0)).or(reset);
        }
        reset
    }

    /// Announced selection. Out-of-range indexes are ignored.
    pub fn select(&mut self, index: Option<usize>) -> Option<SelectionUpdate> {
        if !self.in_range(index) || index == self.selected {
            return None;
        }

        self.selected = index;
        match index {
            None => Some(SelectionUpdate::Cleared),
            Some(index) => {
                let change = IndexChange {
                    index,
                    previous: self.last_index,
                };
                self.last_index = Some(index);
                Some(SelectionUpdate::Moved(change))
            }
        }
    }

    /// Moves the selection without announcing it.
    pub fn select_silently(&mut self, index: usize) -> bool {
        if !self.in_range(Some(index)) {
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Down walks `None, 0, 1, .., n-1, None`; up walks the same cycle backwards.
    pub fn step(&mut self, direction: Direction) -> Option<SelectionUpdate> {
        let count = self.item_count();
        if count == 0 {
            return None;
        }

        let next = match (direction, self.selected) {
            (Direction::Down, None) => Some(0),
            (Direction::Down, Some(index)) if index + 1 < count => Some(index + 1),
            (Direction::Down, Some(_)) => None,
            (Direction::Up, None) => Some(count - 1),
            (Direction::Up, Some(0)) => None,
            (Direction::Up, Some(index)) => Some(index - 1),
        };
        self.select(next)
    }

    pub fn hover_enter(&mut self, index: usize) -> bool {
        if !self.select_silently(index) {
            return false;
        }
        self.hovered = Some(index);
        true
    }

    pub fn hover_leave(&mut self) {
        self.hovered = None;
    }

    /// The index a commit would act on: `explicit` if given and valid, else the selection.
    pub fn commit_target(&self, explicit: Option<usize>) -> Option<usize> {
        let index = explicit.or(self.selected)?;
        (index < self.item_count()).then_some(index)
    }

    fn in_range(&self, index: Option<usize>) -> bool {
        match index {
            None => true,
            Some(index) => index < self.item_count(),
        }
    }
}
