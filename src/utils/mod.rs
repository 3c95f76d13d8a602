pub mod logging;

pub use logging::{init, log_slide, log_startup, print_final_stats, truncate_text};
