//! The fixed allow-list of record collections owned by the blog.
//!
//! Only names produced by [`Collection::table_name`] are ever formatted into
//! SQL text; nothing derived from user input reaches a query string.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    GithubUsers,
    Tags,
    Posts,
    PostTags,
    Comments,
    ReactItems,
}

impl Collection {
    /// Every expected collection, in the order they are queried and reported.
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::GithubUsers,
        Collection::Tags,
        Collection::Posts,
        Collection::PostTags,
        Collection::Comments,
        Collection::ReactItems,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::GithubUsers => "github_users",
            Collection::Tags => "tags",
            Collection::Posts => "posts",
            Collection::PostTags => "post_tags",
            Collection::Comments => "comments",
            Collection::ReactItems => "react_items",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Record count for every allow-listed collection.
///
/// Only [`CollectionCount::from_counts`] builds one, and it refuses a partial
/// set, so a missing collection can never show up as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CollectionCount(BTreeMap<Collection, u64>);

impl CollectionCount {
    pub fn from_counts(
        counts: impl IntoIterator<Item = (Collection, u64)>,
    ) -> Result<Self, Collection> {
        let map: BTreeMap<_, _> = counts.into_iter().collect();
        match Collection::ALL.iter().find(|c| !map.contains_key(c)) {
            Some(missing) => Err(*missing),
            None => Ok(Self(map)),
        }
    }

    pub fn get(&self, collection: Collection) -> u64 {
        self.0.get(&collection).copied().unwrap_or_default()
    }

    /// Counts in allow-list order.
    pub fn iter(&self) -> impl Iterator<Item = (Collection, u64)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}
