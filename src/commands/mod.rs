pub mod price;
pub mod sentiment;
pub mod serve;
pub mod strings;
pub mod watch;
