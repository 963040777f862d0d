pub mod decode_receipt;
pub mod simulate;
pub mod watch;
