//! Per-call sorter options.

use crate::result::SortedItem;
use depsort_core::ItemHandle;
use std::fmt;

/// Called with every discovered item, before the graph is built
pub type InputHook<'a> = Box<dyn FnMut(&[ItemHandle]) + 'a>;

/// Called with the sorted items once ranking succeeded
pub type OutputHook<'a> = Box<dyn FnMut(&[SortedItem<'_>]) + 'a>;

/// Options of one sort
#[derive(Default)]
pub struct SorterOptions<'a> {
    /// Reverse the lexical order used between items of the same rank
    pub reverse_name: bool,
    /// Drop requirements from an item to its own container
    pub skip_dependency_to_container: bool,
    pub hook_input: Option<InputHook<'a>>,
    pub hook_output: Option<OutputHook<'a>>,
}

impl<'a> SorterOptions<'a> {
    /// Create options with every flag off
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reverse_name(mut self, reverse_name: bool) -> Self {
        self.reverse_name = reverse_name;
        self
    }

    pub fn with_skip_dependency_to_container(mut self, skip: bool) -> Self {
        self.skip_dependency_to_container = skip;
        self
    }

    /// Run `hook` on the discovered items before building
    pub fn with_input_hook(mut self, hook: impl FnMut(&[ItemHandle]) + 'a) -> Self {
        self.hook_input = Some(Box::new(hook));
        self
    }

    /// Run `hook` on the sorted entries
    pub fn with_output_hook(mut self, hook: impl FnMut(&[SortedItem<'_>]) + 'a) -> Self {
        self.hook_output = Some(Box::new(hook));
        self
    }
}

impl From<bool> for SorterOptions<'_> {
    fn from(reverse_name: bool) -> Self {
        SorterOptions::new().with_reverse_name(reverse_name)
    }
}

impl fmt::Debug for SorterOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SorterOptions")
            .field("reverse_name", &self.reverse_name)
            .field(
                "skip_dependency_to_container",
                &self.skip_dependency_to_container,
            )
            .field("hook_input", &self.hook_input.is_some())
            .field("hook_output", &self.hook_output.is_some())
            .finish()
    }
}
