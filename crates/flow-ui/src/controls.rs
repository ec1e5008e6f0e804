//! UI control props consumed by the flow screens
//!
//! Controls are plain serializable prop structs handed to the rendering
//! layer. The flow never looks inside a rendered control; it only builds
//! props and reacts to action identifiers.

use serde::{Deserialize, Serialize};

/// Action identifier fired by a control
pub type ActionId = String;

// =============================================================================
// Button
// =============================================================================

/// Button style variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    /// Solid background button
    #[default]
    Solid,
    /// Outlined button with border
    Outline,
    /// Ghost button with no background
    Ghost,
}

/// Button color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonColor {
    /// Primary brand color
    #[default]
    Primary,
    /// Secondary/neutral color
    Secondary,
}

/// Button component properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Accessible label
    pub label: String,
    /// Button style variant
    #[serde(default)]
    pub variant: ButtonVariant,
    /// Button color scheme
    #[serde(default)]
    pub color: ButtonColor,
    /// Whether the button is disabled
    #[serde(default)]
    pub disabled: bool,
    /// Whether the button shows a spinner
    #[serde(default)]
    pub loading: bool,
    /// Action fired on press
    pub on_press: ActionId,
}

impl Button {
    /// Primary action button
    pub fn primary(label: impl Into<String>, on_press: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            variant: ButtonVariant::Solid,
            color: ButtonColor::Primary,
            disabled: false,
            loading: false,
            on_press: on_press.into(),
        }
    }

    /// Secondary action button
    pub fn secondary(label: impl Into<String>, on_press: impl Into<String>) -> Self {
        Self {
            variant: ButtonVariant::Outline,
            color: ButtonColor::Secondary,
            ..Self::primary(label, on_press)
        }
    }

    /// Low-emphasis button
    pub fn ghost(label: impl Into<String>, on_press: impl Into<String>) -> Self {
        Self {
            variant: ButtonVariant::Ghost,
            color: ButtonColor::Secondary,
            ..Self::primary(label, on_press)
        }
    }

    /// Set disabled state
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set loading state
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }
}

// =============================================================================
// Choice Controls
// =============================================================================

/// One option of a select or card group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Display label
    pub label: String,
    /// Secondary line (cards only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SelectOption {
    /// Create an option
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into(), detail: None }
    }

    /// Add a secondary line
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// =============================================================================
// Shells
// =============================================================================

/// Overlay container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// Centered dialog over a backdrop
    Dialog,
    /// Panel sliding in from the right edge
    Drawer,
}

/// Overlay container properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shell {
    /// Container kind
    pub kind: ShellKind,
    /// Title in the container's own header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether the container is open
    pub is_open: bool,
    /// Show close button in header
    pub show_close_button: bool,
    /// Whether clicking the backdrop dismisses
    pub dismiss_on_backdrop: bool,
    /// Action fired when the container closes
    pub on_close: ActionId,
}

impl Shell {
    /// An open dialog
    pub fn dialog() -> Self {
        Self {
            kind: ShellKind::Dialog,
            title: None,
            is_open: true,
            show_close_button: true,
            dismiss_on_backdrop: true,
            on_close: "close".to_string(),
        }
    }

    /// An open drawer with a header title
    pub fn drawer(title: impl Into<String>) -> Self {
        Self { kind: ShellKind::Drawer, title: Some(title.into()), ..Self::dialog() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_constructors() {
        let primary = Button::primary("Continue", "next");
        assert_eq!(primary.variant, ButtonVariant::Solid);
        assert_eq!(primary.color, ButtonColor::Primary);
        assert_eq!(primary.on_press, "next");

        let back = Button::secondary("Back", "back");
        assert_eq!(back.variant, ButtonVariant::Outline);
        assert_eq!(back.label, "Back");
    }

    #[test]
    fn test_button_serialization() {
        let button = Button::primary("Submit", "submit").disabled(true);
        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(json["variant"], "solid");
        assert_eq!(json["color"], "primary");
        assert_eq!(json["disabled"], true);
    }

    #[test]
    fn test_shells() {
        let dialog = Shell::dialog();
        assert_eq!(dialog.kind, ShellKind::Dialog);
        assert!(dialog.title.is_none());

        let drawer = Shell::drawer("Reimburse");
        assert_eq!(drawer.kind, ShellKind::Drawer);
        assert_eq!(drawer.title.as_deref(), Some("Reimburse"));
        assert!(drawer.is_open);
    }
}
