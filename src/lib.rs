//! Job ad pipeline: filter posting ids from a search API, crawl each
//! posting's detail page into a [`record::JobRecord`], render records to PDF.

pub mod crawler;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod settings;
pub mod store;
#[cfg(test)]
mod testing;
