// Listing related constants
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

// Longest path accepted from or echoed back to clients
pub const MAX_PATH_LENGTH: usize = 1024;

// Used when neither the client nor the backend supplied a content type
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// Filesystem default
pub const DEFAULT_FS_ROOT: &str = "./storage";
