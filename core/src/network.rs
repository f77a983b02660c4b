pub mod dns;
pub mod tcp;
