pub mod error;
pub mod fetcher;
pub mod response;
pub mod sitemap;

pub use error::ScanError;
pub use fetcher::{Fetch, HttpFetcher};
pub use response::FetchResponse;
pub use sitemap::{
    Resolution, ResolutionError, SitemapDocument, SitemapResolver, parse_sitemap_document,
};
