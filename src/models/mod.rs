pub mod assessment;
pub mod example;
pub mod result;
pub mod state;

pub use assessment::*;
pub use example::*;
pub use result::*;
pub use state::*;
