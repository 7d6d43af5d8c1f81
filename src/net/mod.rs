//! Networking modules for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` owns transport and status mapping, `types` defines the wire schema,
//! and the remaining modules are thin per-area endpoint wrappers.

pub mod auth;
pub mod catalog;
pub mod http;
pub mod organizations;
pub mod payments;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support {
    //! Stub backend bound to an ephemeral local port.

    use crate::config::ClientConfig;
    use crate::net::http::ApiClient;

    /// Serve `router` on `127.0.0.1:0` and return a client pointed at it.
    pub(crate) async fn spawn_stub(router: axum::Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let config = ClientConfig::default()
            .with_base_url(&format!("http://{addr}/api"))
            .unwrap();
        ApiClient::new(&config).unwrap()
    }

    /// A client pointed at a port nothing is listening on.
    pub(crate) async fn unreachable_client() -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let config = ClientConfig::default()
            .with_base_url(&format!("http://{addr}/api"))
            .unwrap();
        ApiClient::new(&config).unwrap()
    }
}
