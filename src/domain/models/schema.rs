//! Descriptor of the relational schema produced by the migration history.

/// Bookmark store schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Highest migration version (1-based count of migrations)
    pub version: u32,
    /// Tables created by the migration history, in creation order
    pub tables: &'static [&'static str],
}

/// The schema the embedded migrations build.
pub const SCHEMA: Schema = Schema {
    version: 3,
    tables: &[
        "users",
        "bookmarks",
        "bookmark_tags",
        "tags_on_bookmarks",
        "bookmark_lists",
        "bookmarks_in_lists",
        "assets",
    ],
};

impl Schema {
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains(&name)
    }
}
