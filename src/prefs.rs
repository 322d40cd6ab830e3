//! Product-list display preferences kept next to the widget layout.

use std::fmt;
use std::str::FromStr;

use crate::constants::{PRODUCT_SORT_KEY, PRODUCT_VIEW_KEY};
use crate::storage::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
    Compact,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
            ViewMode::Compact => "compact",
        }
    }
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            "compact" => Ok(ViewMode::Compact),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Category,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::PriceAsc => "price_asc",
            SortMode::PriceDesc => "price_desc",
            SortMode::Category => "category",
        }
    }
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortMode::Newest),
            "price_asc" => Ok(SortMode::PriceAsc),
            "price_desc" => Ok(SortMode::PriceDesc),
            "category" => Ok(SortMode::Category),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ProductPrefs<S> {
    store: S,
}

impl<S: KeyValueStore> ProductPrefs<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn view(&self) -> ViewMode {
        self.store
            .get(PRODUCT_VIEW_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_view(&self, view: ViewMode) -> Result<(), StoreError> {
        self.store.set(PRODUCT_VIEW_KEY, view.as_str())
    }

    pub fn sort(&self) -> SortMode {
        self.store
            .get(PRODUCT_SORT_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_sort(&self, sort: SortMode) -> Result<(), StoreError> {
        self.store.set(PRODUCT_SORT_KEY, sort.as_str())
    }
}
