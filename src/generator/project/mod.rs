mod format;
mod generate;

pub use format::{format_source, RUSTFMT_ENV};
pub use generate::{
    generate_from_inputs, write_generation, write_json_model, GenerateOptions, WriteSummary,
    GENERATED_HEADER,
};
