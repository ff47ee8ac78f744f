mod check;
mod info;

pub use check::cmd_check;
pub use info::cmd_info;
