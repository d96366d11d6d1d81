pub mod control_reader;
pub mod data_conn;
pub mod network;
pub mod pasv;
pub mod port;
