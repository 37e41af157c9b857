// Elasticsearch REST client
pub mod search_client;
pub mod search_response;
