/// One entry in a dropdown. `action` is handed back to the caller when the
/// entry is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem<A> {
    pub label: String,
    pub action: A,
    pub disabled: bool,
}

impl<A> MenuItem<A> {
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            action,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_selectable(&self) -> bool {
        !self.disabled
    }
}
