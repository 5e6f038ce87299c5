//! Extension traits for wiring the expansion engine to a backend.

mod line_fetcher;

pub use line_fetcher::{split_payload, FetchError, LineBound, LineFetcher, NoOpLineFetcher};
