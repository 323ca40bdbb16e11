pub mod portal_client;

pub use portal_client::{
    PortalClient, RawResponse, TlsMode, Transport, TransportConfig, TransportRequest,
};
