use crate::{COMPONENT_SEPARATOR, FIELD_SEPARATOR};

/// One line of a message: a type tag followed by positional fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    fields: Vec<String>,
}

impl Segment {
    /// Split one segment line into fields.
    ///
    /// Never fails; an empty line produces a segment with an empty tag.
    pub fn parse(line: &str) -> Self {
        let fields = line
            .trim_end()
            .split(FIELD_SEPARATOR)
            .map(str::to_owned)
            .collect();
        Self { fields }
    }

    /// The segment type tag (`PID`, `OBX`, ...).
    pub fn tag(&self) -> &str {
        self.field(0)
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag() == tag
    }

    /// Field at split position `index`, or `""` when absent.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Component `component` of field `index`, or `""` when absent.
    pub fn component(&self, index: usize, component: usize) -> &str {
        self.field(index)
            .split(COMPONENT_SEPARATOR)
            .nth(component)
            .unwrap_or("")
    }

    /// All components of field `index`. An empty field yields a single empty component.
    pub fn components(&self, index: usize) -> Vec<&str> {
        self.field(index).split(COMPONENT_SEPARATOR).collect()
    }

    /// Number of fields supplied, counting the tag.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(String::is_empty)
    }
}
