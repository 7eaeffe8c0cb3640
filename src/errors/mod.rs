/// Errors merged into a single error for a whole annotation run
pub mod annotation_error;
/// Fatal errors about unsupported or malformed inputs and configurations
pub mod format_error;
/// Errors when retrieving protein records
pub mod record_error;
/// Errors of the statistics engine
pub mod statistics_error;
/// Errors related to the column stores
pub mod table_error;
