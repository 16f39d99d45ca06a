// Storage operation traits and implementations
pub mod delete;
pub mod list;
pub mod read;
pub mod stat;
pub mod upload;

pub use delete::Deleter;
pub use list::Lister;
pub use read::FileReader;
pub use stat::Stater;
pub use upload::Uploader;
