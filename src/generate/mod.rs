//! Image generation: prompt assembly, the generator seam and the generate-then-store flow.

pub(crate) mod client;
pub(crate) mod flow;
pub(crate) mod process;
pub(crate) mod prompt;
