pub mod item_id;
pub mod notice;

pub use item_id::generate_item_id;
pub use notice::{Notice, NoticeKind};
