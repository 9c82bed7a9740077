pub mod client;
pub mod cmd;
pub mod config;
pub mod dict;
pub mod list;
pub mod log;
pub mod net;
pub mod obj;
pub mod proto;
pub mod server;
pub mod skiplist;
pub mod stream;
pub mod util;
