//! Asset entity and its query/aggregate value objects.

pub mod category;
pub mod model;
pub mod query;
pub mod stats;

pub use category::AssetCategory;
pub use model::{Asset, AssetMetaUpdate, DEFAULT_FOLDER, NewAsset, PENDING_PLACEHOLDER, extension_of};
pub use query::{AssetBrowseQuery, ContentTypeFilter};
pub use stats::{AssetStats, CategoryStat, FolderStat};
