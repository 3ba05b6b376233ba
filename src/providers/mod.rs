pub mod twelve_data;
pub mod util;
