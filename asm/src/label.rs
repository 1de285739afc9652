use indexmap::IndexMap;

/// Label name -> program word address.
#[derive(Debug, Default)]
pub struct Labels(IndexMap<String, u16>);

impl Labels {
    pub fn new() -> Self {
        Labels(IndexMap::new())
    }

    /// Returns the previous address when the label was already defined.
    pub fn insert(&mut self, name: String, addr: u16) -> Option<u16> {
        self.0.insert(name, addr)
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.0.iter().map(|(name, addr)| (name.as_str(), *addr))
    }
}
