// Descriptor registry
// Owned by a single generation pass; assigns every descriptor a unique symbol

use super::descriptor::BindingDescriptor;
use rustc_hash::FxHashMap;

/// A descriptor together with the symbol its trampoline is emitted under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBinding {
    pub symbol: String,
    pub descriptor: BindingDescriptor,
}

/// Collects descriptors in registration order.
///
/// Symbols are derived from [`BindingDescriptor::base_symbol`]. The first use
/// of a base keeps it as is; later uses get `1`, `2`, ... appended. The next
/// suffix for each base is kept in a counter so resolution never re-parses a
/// candidate name.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    by_symbol: FxHashMap<String, usize>,
    ordered: Vec<RegisteredBinding>,
    next_suffix: FxHashMap<String, usize>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor and return its generated symbol. Never fails.
    pub fn register(&mut self, descriptor: BindingDescriptor) -> String {
        let base = descriptor.base_symbol();
        let suffix = self.next_suffix.entry(base.clone()).or_insert(0);

        let mut symbol = with_suffix(&base, *suffix);
        while self.by_symbol.contains_key(&symbol) {
            *suffix += 1;
            symbol = with_suffix(&base, *suffix);
        }
        *suffix += 1;

        if symbol != base {
            tracing::debug!(%base, %symbol, binding = %descriptor, "resolved binding name collision");
        }

        self.by_symbol.insert(symbol.clone(), self.ordered.len());
        self.ordered.push(RegisteredBinding {
            symbol: symbol.clone(),
            descriptor,
        });
        symbol
    }

    pub fn get(&self, symbol: &str) -> Option<&BindingDescriptor> {
        self.by_symbol
            .get(symbol)
            .map(|&index| &self.ordered[index].descriptor)
    }

    /// All bindings in registration order
    pub fn descriptors(&self) -> &[RegisteredBinding] {
        &self.ordered
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(|b| b.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

fn with_suffix(base: &str, suffix: usize) -> String {
    if suffix == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, suffix)
    }
}
