mod error;
mod link;
mod pacer;

pub use self::error::{Error, Result};
pub use self::link::{Link, Ready};
pub use self::pacer::{CancelToken, Pacer};
