pub mod execute_query_request;
pub mod extract_json_request;
pub mod generate_dsl_request;
pub mod time_analysis_request;
