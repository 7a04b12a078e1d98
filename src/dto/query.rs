use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Ordering applied to catalog listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently added first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Highest play count first.
    Popular,
    /// Highest rating first.
    Rating,
    /// Alphabetical by title, ignoring case.
    Title,
}

/// Filters accepted by `GET /games`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameListQuery {
    /// Case-insensitive text matched against title, description and tags.
    pub search: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    /// Only featured (`true`) or only regular (`false`) games.
    pub featured: Option<bool>,
    /// Ordering, `newest` when omitted.
    #[param(inline)]
    pub sort: Option<SortOrder>,
}
