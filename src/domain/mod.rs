pub mod comment;
pub mod feed;
pub mod item;

pub use comment::{CommentNode, CommentTree};
pub use feed::{FeedType, Generation};
pub use item::{Item, ItemRole};
