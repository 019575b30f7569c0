use crate::{Driver, Executor, Result};
use std::{
    fmt::{self, Debug},
    future::Future,
    marker::PhantomData,
};

pub trait Connection: Executor + Sized {
    /// Open a connection to the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;
}

/// Source of fresh connections, one per [`ScopedExecutor`](crate::ScopedExecutor) call.
pub trait ConnectionFactory: Send + Sync {
    type Connection: Connection;

    fn driver(&self) -> &<Self::Connection as Executor>::Driver;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// Factory connecting every time to the same URL.
pub struct UrlConnector<C: Connection> {
    url: String,
    driver: C::Driver,
    _connection: PhantomData<fn() -> C>,
}

impl<C: Connection> UrlConnector<C> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            driver: Default::default(),
            _connection: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<C: Connection> ConnectionFactory for UrlConnector<C> {
    type Connection = C;

    fn driver(&self) -> &C::Driver {
        &self.driver
    }

    fn connect(&self) -> impl Future<Output = Result<C>> + Send {
        C::connect(&self.url)
    }
}

impl<C: Connection> Debug for UrlConnector<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlConnector")
            .field("driver", &<C::Driver as Driver>::NAME)
            .field("url", &self.url)
            .finish()
    }
}
