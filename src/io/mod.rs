pub mod config_io;
pub mod external;
pub mod kv;
pub mod storage;
