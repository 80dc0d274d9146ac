//! Widget library.
//!
//! Each widget is a [`Component`] with its own handler table, stacked from
//! the shared layers in [`crate::dispatch::layers`] plus whatever the widget
//! adds. Nested parts (tabs, rows, option lists) are resolved through the
//! parent and stay scoped under the parent's locator.

mod basic;
mod checkbox;
mod combo_box;
mod data_grid;
mod date_field;
mod popup_button;
mod side_menu;
mod tab_sheet;
mod text_input;

pub use basic::{Button, Label, Untyped};
pub use checkbox::CheckBox;
pub use combo_box::{ComboBox, OptionsPopup};
pub use data_grid::{DataGrid, Row};
pub use date_field::{DateField, TimeField};
pub use popup_button::{PopupButton, PopupContent};
pub use side_menu::SideMenu;
pub use tab_sheet::{Tab, TabSheet};
pub use text_input::{TextArea, TextField};

use crate::component::Component;
use crate::condition::Condition;
use crate::driver::keys;
use crate::locator::{CompositeLocator, LocatorStep};
use crate::result::PagewireResult;

/// `<input>` below the root
pub(crate) fn input_below(root: &CompositeLocator) -> CompositeLocator {
    root.then(LocatorStep::tag("input"))
}

/// Value of the input once the component is visible
pub(crate) fn read_input<C: Component>(component: &C) -> PagewireResult<String> {
    component.should(&Condition::Visible)?;
    Ok(component.probe().input()?.value()?.unwrap_or_default())
}

/// Select everything in the input and delete it
pub(crate) fn clear_input<C: Component>(component: &C) -> PagewireResult<()> {
    let input = component.probe().input()?;
    input.send_keys(&keys::chord(&[keys::CONTROL, 'a']))?;
    input.send_keys(&keys::DELETE.to_string())?;
    Ok(())
}

/// Wait until the field accepts input, clear it and type `value`
pub(crate) fn replace_input<C: Component>(component: &C, value: &str) -> PagewireResult<()> {
    component
        .should(&Condition::Visible)?
        .should(&Condition::Enabled)?
        .should(&Condition::Editable)?;
    component.probe().input()?.click()?;
    clear_input(component)?;
    if !value.is_empty() {
        component.probe().input()?.send_keys(value)?;
    }
    Ok(())
}
