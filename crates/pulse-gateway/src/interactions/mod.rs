//! Interaction contextualization
//!
//! Interaction frames are never cached: they are decoded into a typed
//! context carrying resolved option values, then dispatched under a name
//! derived from the invoked command or component.

mod context;
mod options;

pub use context::{
    ComponentField, ComponentRow, InteractionContext, InteractionData, InteractionKind,
    ResolvedData, ResolvedValue,
};
pub use options::{find_focused, sub_command_path, CommandOption, OptionType, ValueOption};
