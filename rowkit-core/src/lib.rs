mod as_value;
mod column;
mod connection;
mod driver;
mod entity;
mod error;
mod executor;
mod join;
mod metadata;
mod outcome;
mod params;
mod query;
mod service;
mod sql_writer;
mod statement;
mod table;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use column::*;
pub use connection::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use join::*;
pub use metadata::*;
pub use outcome::*;
pub use params::*;
pub use query::*;
pub use service::*;
pub use sql_writer::*;
pub use statement::*;
pub use table::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
