pub mod access_jwt;
pub mod claims;
pub mod factory;
pub mod gate;
pub mod policy;

pub use factory::build_request_gate;
pub use gate::RequestGate;
