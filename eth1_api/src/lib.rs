pub use crate::{
    auth::{Auth, Options as AuthOptions},
    error::{handle_rpc_error, Error, RequestFailure, RpcError},
    eth1_api::{Eth1Api, ForkChoiceUpdated},
};

mod auth;
mod error;
mod eth1_api;
