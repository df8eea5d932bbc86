mod http_provider;

pub use http_provider::HttpIdentityProvider;
