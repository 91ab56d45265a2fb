use crate::constants::DEFAULT_PRIMARY_KEY;

/// A persisted record type: names its table and primary key column.
///
/// ```rust
/// use query_conditions::database::Model;
///
/// struct Article;
///
/// impl Model for Article {
///     fn table_name() -> &'static str {
///         "articles"
///     }
/// }
///
/// assert_eq!(Article::primary_key(), "id");
/// ```
pub trait Model {
    fn table_name() -> &'static str;

    fn primary_key() -> &'static str {
        DEFAULT_PRIMARY_KEY
    }
}
