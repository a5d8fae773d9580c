use std::collections::HashMap;
use std::rc::Rc;

use crate::arena::Arena;

/// A handle for an interned byte string. Two identifiers compare equal iff
/// the bytes they were interned from are identical. Handles stay valid for
/// the lifetime of the owning `StringTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(u32);

/// Interns byte strings and maps each distinct one to a stable `Identifier`.
pub struct StringTable {
    map: HashMap<Rc<[u8]>, Identifier>,
    names: Arena<Rc<[u8]>>,
}

impl StringTable {
    pub fn new() -> StringTable {
        StringTable {
            map: HashMap::new(),
            names: Arena::new(),
        }
    }

    /// Return the identifier for `name`, interning it on first sight.
    /// Re-interning the same bytes yields an equal handle.
    pub fn get_identifier(&mut self, name: impl AsRef<[u8]>) -> Identifier {
        let name = name.as_ref();
        if let Some(&identifier) = self.map.get(name) {
            return identifier;
        }
        let owned: Rc<[u8]> = Rc::from(name);
        let identifier = Identifier(self.names.alloc(owned.clone()));
        self.map.insert(owned, identifier);
        identifier
    }

    /// The interned bytes behind `identifier`.
    pub fn name(&self, identifier: Identifier) -> &[u8] {
        &self.names.get(identifier.0)[..]
    }
}

impl Default for StringTable {
    fn default() -> StringTable {
        StringTable::new()
    }
}
