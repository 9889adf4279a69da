pub mod git;
pub mod history;
pub mod log_line;
pub mod resolve;
pub mod status;
