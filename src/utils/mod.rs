//! Commonly used utilities like handles, pools and colors.

#[macro_use]
pub mod handle;
pub mod handle_pool;
pub mod object_pool;

mod color;

pub use self::color::Color;
pub use self::handle::{Handle, HandleIndex, HandleLike};
pub use self::handle_pool::HandlePool;
pub use self::object_pool::ObjectPool;
