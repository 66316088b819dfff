mod config_gen;
mod evaluate;
mod presets;

pub use config_gen::config_generate;
pub use evaluate::{EvaluateArgs, build_context, evaluate};
pub use presets::{preset_json, print_presets};
