//! Enrichment data sources. Both clients absorb their own failures: a broken upstream degrades to
//! an empty value and a log line, never to an error the pipeline has to handle.

pub mod market;
pub mod news;
