//! CSS counters and their scopes.
//!
//! [CSS Lists § 4 Automatic Numbering With Counters](https://www.w3.org/TR/css-lists-3/#auto-numbering)

use std::collections::HashMap;

use quire_style::ComputedStyle;

/// The counter that numbers list items.
pub const LIST_ITEM: &str = "list-item";

/// The counter that numbers footnotes.
pub const FOOTNOTE: &str = "footnote";

/// Names of counters instantiated by the children of one element.
///
/// [§ 4.4 Nested Counters and Scope](https://www.w3.org/TR/css-lists-3/#nested-counters)
/// "The scope of a counter therefore starts at the first element in the
/// document that has a counter-reset for that counter and includes the
/// element's descendants and its following siblings with their
/// descendants."
#[derive(Debug, Default)]
pub struct SiblingScope {
    names: Vec<String>,
}

/// Every counter in scope, innermost instance last.
#[derive(Debug, Default)]
pub struct Counters {
    values: HashMap<String, Vec<i32>>,
}

impl Counters {
    /// No counters at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost value of `name`, if the counter is in scope.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<i32> {
        self.values.get(name).and_then(|v| v.last()).copied()
    }

    /// Every instance of `name`, outermost first.
    #[must_use]
    pub fn values(&self, name: &str) -> &[i32] {
        self.values.get(name).map_or(&[], Vec::as_slice)
    }

    /// [§ 4.1 'counter-reset'](https://www.w3.org/TR/css-lists-3/#counter-reset)
    ///
    /// A reset on an element whose earlier sibling already reset the same
    /// counter replaces that instance instead of nesting a new one.
    pub fn reset(&mut self, scope: &mut SiblingScope, name: &str, value: i32) {
        let instances = self.values.entry(name.to_owned()).or_default();
        if scope.names.iter().any(|n| n == name)
            && let Some(last) = instances.last_mut()
        {
            *last = value;
        } else {
            instances.push(value);
            scope.names.push(name.to_owned());
        }
    }

    /// [§ 4.2 'counter-increment'](https://www.w3.org/TR/css-lists-3/#increment-set)
    ///
    /// "If there is not currently a counter of the given name on the
    /// element, the element instantiates a new counter of the given name
    /// with a starting value of 0 before setting or incrementing its value."
    pub fn increment(&mut self, scope: &mut SiblingScope, name: &str, by: i32) {
        self.ensure(scope, name);
        if let Some(last) = self.values.get_mut(name).and_then(|v| v.last_mut()) {
            *last = last.saturating_add(by);
        }
    }

    /// `counter-set`
    pub fn set(&mut self, scope: &mut SiblingScope, name: &str, value: i32) {
        self.ensure(scope, name);
        if let Some(last) = self.values.get_mut(name).and_then(|v| v.last_mut()) {
            *last = value;
        }
    }

    fn ensure(&mut self, scope: &mut SiblingScope, name: &str) {
        if self.value(name).is_none() {
            self.reset(scope, name, 0);
        }
    }

    /// Apply the counter properties of an element, in the order the
    /// properties are defined to take effect: resets, then increments,
    /// then sets.
    ///
    /// A list item increments `list-item` by one unless its own
    /// `counter-increment` mentions that counter.
    pub fn apply(&mut self, scope: &mut SiblingScope, style: &ComputedStyle) {
        for (name, value) in &style.counter_reset {
            self.reset(scope, name, *value);
        }
        for (name, by) in &style.counter_increment {
            self.increment(scope, name, *by);
        }
        if style.display.is_list_item() && !style.counter_increment.iter().any(|(n, _)| n == LIST_ITEM) {
            self.increment(scope, LIST_ITEM, 1);
        }
        for (name, value) in &style.counter_set {
            self.set(scope, name, *value);
        }
    }

    /// Drop the instances a finished sibling level created.
    pub fn leave(&mut self, scope: SiblingScope) {
        for name in scope.names {
            if let Some(instances) = self.values.get_mut(&name) {
                let _ = instances.pop();
                if instances.is_empty() {
                    let _ = self.values.remove(&name);
                }
            }
        }
    }
}
