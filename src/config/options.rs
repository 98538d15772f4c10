/// Options for mutating operations (`set`, `set_all`, `delete`, `delete_all`)
///
/// Fields left as `None` fall back to the store-wide defaults in
/// [`StoreConfig`](crate::StoreConfig).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Pretty-print the JSON written by this call
    pub prettify: Option<bool>,
}

impl SetOptions {
    /// Options that inherit every store default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override pretty printing for this call
    #[must_use]
    pub fn prettify(mut self, prettify: bool) -> Self {
        self.prettify = Some(prettify);
        self
    }
}
