//! Workbench stage: placed items, selection and pointer interaction.

pub(crate) mod item;
pub(crate) mod selection;
pub(crate) mod stage;
