pub mod push_server;
pub mod status_server;
