//! Host Atlas: resolves IP addresses and host names into ownership and
//! region metadata, failing over between public geolocation APIs when
//! one of them starts rate limiting.

pub mod lookup;
pub mod report;
