pub mod pipeline;
pub mod stage1_grammar;
pub mod stage2_adequacy;
pub mod stage3_formatting;
pub mod stage4_synthesis;

pub use pipeline::*;
pub use stage1_grammar::*;
pub use stage2_adequacy::*;
pub use stage3_formatting::*;
pub use stage4_synthesis::*;
