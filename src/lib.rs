pub mod config;
pub mod prober;
pub mod protocol;
pub mod responder;
pub mod util;
