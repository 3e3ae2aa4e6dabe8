pub mod echo;
pub mod envelope;
pub mod metadata;
pub mod node;

pub use echo::{parse_created_at, resolve_image_url, FeedItem, Image, ImageSource, Tag};
pub use envelope::{ApiResponse, PageRequest, PaginationResult};
pub use metadata::NodeMetadata;
pub use node::{normalize_address, HubEntry, NodeIdentity};
