pub mod constants;
pub mod crypto;
pub mod log_message;
pub mod oid;
pub mod tlv;
pub mod validation;
pub mod verification;
