#![feature(async_closure)]

extern crate alloc;
extern crate core;

#[macro_use]
extern crate common;
#[macro_use]
extern crate macros;

pub mod client;
pub mod error;
pub mod factory;
pub mod inject;
pub mod introspect;
pub mod process;
pub mod shell;
pub mod spec;
pub mod testing;
pub mod types;

pub use client::{ClusterClient, HeartbeatConfig, PortPool};
pub use error::RemoteProcessError;
pub use factory::RemoteProcessFactory;
pub use process::RemoteProcess;
pub use types::*;
