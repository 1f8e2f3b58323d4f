use crate::model::{CityKey, CitySummary, WatchList};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Summary,
    Detail(CityKey),
}

/// Summary/detail switch. Holds nothing but the selected city.
#[derive(Debug, Default)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &View {
        &self.current
    }

    pub fn select(&mut self, key: CityKey) {
        self.current = View::Detail(key);
    }

    pub fn back(&mut self) {
        self.current = View::Summary;
    }

    pub fn selected(&self) -> Option<&CityKey> {
        match &self.current {
            View::Detail(key) => Some(key),
            View::Summary => None,
        }
    }

    /// Entry for the selected city. Drops back to the summary view when the
    /// city is no longer in `list`.
    pub fn resolve<'a>(&mut self, list: &'a WatchList) -> Option<&'a CitySummary> {
        let key = self.selected()?;
        let found = list.get(key);
        if found.is_none() {
            self.back();
        }
        found
    }
}
