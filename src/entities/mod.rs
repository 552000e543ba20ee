pub mod approval_status;
pub mod blog;
pub mod blog_blog_category;
pub mod blog_category;
pub mod blog_tag;
pub mod category;
pub mod island;
pub mod item;
pub mod item_rating;
pub mod item_sub;
pub mod item_type;
pub mod role;
pub mod sub;
pub mod tag;
pub mod user;
pub mod wishlist;
pub mod zone;

pub use approval_status::ApprovalStatus;
pub use island::Island;
pub use item_type::ItemType;
pub use role::Role;
