pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_context, exit_code, parse_categories, pick_key, probe_listing, verbosity_level,
    write_output,
};
