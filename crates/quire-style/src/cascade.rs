//! Turning a sorted declaration list into a [`ComputedStyle`].
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! Matching and ordering happen in the resolver; this module takes the
//! winning declarations in ascending priority and applies them on top of
//! the inherited style.

use std::collections::HashMap;

use quire_common::Diagnostics;

use crate::computed::{ComputedStyle, is_inherited};
use crate::error::StyleError;
use crate::properties::{WideKeyword, expand_shorthand};
use crate::sheet::Declaration;
use crate::values::{DEFAULT_FONT_SIZE, ValueContext};
use crate::variables::{contains_var, resolve_custom_properties, substitute_in_value};

/// Document-wide inputs to value computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeEnv {
    /// Root element font size, the basis for `rem`.
    pub root_font_size: f32,
    /// Basis for `vw`.
    pub viewport_width: f32,
    /// Basis for `vh`.
    pub viewport_height: f32,
}

impl Default for CascadeEnv {
    fn default() -> Self {
        Self {
            root_font_size: DEFAULT_FONT_SIZE,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

/// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// Put declarations in application order: normal ones first, then the
/// `!important` ones, each group keeping its incoming order.
#[must_use]
pub fn order_by_importance(declarations: Vec<Declaration>) -> Vec<Declaration> {
    let (important, mut normal): (Vec<_>, Vec<_>) =
        declarations.into_iter().partition(|d| d.important);
    normal.extend(important);
    normal
}

/// Compute the style of one element (or pseudo-element, or page area).
///
/// `declarations` must already be in application order: later entries win.
/// Failed declarations are dropped and reported to `diagnostics`.
#[must_use]
pub fn compute_style(
    declarations: &[Declaration],
    parent: Option<&ComputedStyle>,
    is_root: bool,
    env: &CascadeEnv,
    diagnostics: &mut Diagnostics,
) -> ComputedStyle {
    let initial = ComputedStyle::initial();
    let mut style = parent.map_or_else(ComputedStyle::initial, ComputedStyle::inherit_from);
    let parent_font_size = parent.map_or(DEFAULT_FONT_SIZE, |p| p.font_size);

    // STEP 1: custom properties, resolved against each other and the
    // inherited set.
    let mut declared_custom = HashMap::new();
    for decl in declarations.iter().filter(|d| d.name.starts_with("--")) {
        let _ = declared_custom.insert(decl.name.clone(), decl.value.clone());
    }
    if !declared_custom.is_empty() {
        let resolved = resolve_custom_properties(&declared_custom, &style.custom_properties);
        for name in &resolved.cyclic {
            diagnostics.warn("style", &format!("custom property '{name}' is part of a cycle"));
        }
        style.custom_properties = resolved.values;
    }

    // STEP 2: substitute var() and expand shorthands into longhands.
    let mut longhands: Vec<(String, String)> = Vec::new();
    for decl in declarations.iter().filter(|d| !d.name.starts_with("--")) {
        let value = if contains_var(&decl.value) {
            if let Some(substituted) = substitute_in_value(&decl.value, &style.custom_properties) {
                substituted
            } else {
                // [§ 3.1 Invalid Variables](https://www.w3.org/TR/css-variables-1/#invalid-variables)
                // "the property's value is the computed value as if the
                // property's value had been specified as the unset keyword."
                let error = StyleError::InvalidAtComputedValueTime {
                    property: decl.name.clone(),
                    reason: format!("cannot substitute '{}'", decl.value),
                };
                diagnostics.warn("style", &error.to_string());
                "unset".to_string()
            }
        } else {
            decl.value.clone()
        };
        match expand_shorthand(&decl.name, &value) {
            Ok(pairs) => longhands.extend(pairs),
            Err(error) => diagnostics.warn("style", &error.to_string()),
        }
    }

    let mut ctx = ValueContext {
        font_size: parent_font_size,
        parent_font_size,
        root_font_size: if is_root { parent_font_size } else { env.root_font_size },
        viewport_width: env.viewport_width,
        viewport_height: env.viewport_height,
    };

    // STEP 3: font-size first, every em below depends on it.
    if let Some((_, value)) = longhands.iter().rev().find(|(name, _)| name == "font-size") {
        apply_one(&mut style, "font-size", value, parent, &initial, &ctx, diagnostics);
    }
    ctx.font_size = style.font_size;
    if is_root {
        ctx.root_font_size = style.font_size;
    }

    // STEP 4: color before the rest so `currentcolor` sees the final value.
    if let Some((_, value)) = longhands.iter().rev().find(|(name, _)| name == "color") {
        apply_one(&mut style, "color", value, parent, &initial, &ctx, diagnostics);
    }

    // STEP 5: everything else in order.
    for (name, value) in &longhands {
        if name == "font-size" || name == "color" {
            continue;
        }
        apply_one(&mut style, name, value, parent, &initial, &ctx, diagnostics);
    }

    style.fix_up(is_root);
    style
}

fn apply_one(
    style: &mut ComputedStyle,
    name: &str,
    value: &str,
    parent: Option<&ComputedStyle>,
    initial: &ComputedStyle,
    ctx: &ValueContext,
    diagnostics: &mut Diagnostics,
) {
    if let Some(keyword) = WideKeyword::parse(value) {
        let inherit = match keyword {
            WideKeyword::Inherit => true,
            WideKeyword::Initial => false,
            WideKeyword::Unset => is_inherited(name),
        };
        let source = if inherit { parent.unwrap_or(initial) } else { initial };
        if !style.copy_property(name, source) {
            diagnostics.warn("style", &StyleError::UnknownProperty(name.to_string()).to_string());
        }
        return;
    }
    let result = if name == "font-size" {
        style.apply_font_size(value, ctx)
    } else {
        style.apply_longhand(name, value, ctx)
    };
    if let Err(error) = result {
        diagnostics.warn("style", &error.to_string());
    }
}
