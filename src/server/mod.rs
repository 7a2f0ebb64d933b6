pub mod authn;
pub mod authz;
pub mod config;
pub mod factory;
pub mod gate;
pub mod handlers;
pub mod response;
pub mod restful;
pub mod session;
