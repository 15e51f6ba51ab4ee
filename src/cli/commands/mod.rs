pub mod dar20;
pub mod decode;
pub mod mint;
pub mod server;
pub mod test_rpc;
pub mod wallet;
