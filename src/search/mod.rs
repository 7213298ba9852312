//! Review listing: parameter handling, query construction and response formatting.

pub mod params;
pub mod query;
pub mod response;

pub use params::{ParamError, RatingFilter, SearchParams};
pub use query::{build_search_query, Clause, ContentQuery, QueryPage};
pub use response::{build_response, FormatOptions, SearchResponse};
