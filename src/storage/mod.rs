mod articles;
mod preferences;
mod schema;
mod subscriptions;
mod tokens;
mod types;
mod users;

pub use schema::Database;
pub use types::{
    Article, ArticlePage, DatabaseError, NewArticle, Role, Tier, User, UserSubscription,
};
pub use users::UserFilter;

pub(crate) use articles::{delete_articles_for_user_tx, insert_articles_tx};
pub(crate) use preferences::{replace_names_tx, PreferenceKind};
pub(crate) use subscriptions::{get_subscription_tx, update_subscription_tx};
