pub mod constants;
pub mod logger;
pub mod paths;
pub mod redact;
pub mod time;
