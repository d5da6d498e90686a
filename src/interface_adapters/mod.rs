// Interface adapters: wire protocol, hit resolvers, and network handling.

pub mod clients;
pub mod http;
pub mod net;
pub mod protocol;
pub mod routes;
pub mod state;
