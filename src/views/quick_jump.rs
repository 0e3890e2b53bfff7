use crate::components::jump_cell::jump_row;
use crate::message::Message;
use crate::navigator::SliceNavigator;
use iced::widget::{column, row, text, Column};
use iced::Length;

/// One row of the quick navigation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickJumpEntry {
    /// 1-based position in the table.
    pub index: usize,
    pub slice: usize,
    pub enabled: bool,
    pub selected: bool,
}

pub fn quick_jump_entries(shortcuts: &[usize], navigator: &SliceNavigator) -> Vec<QuickJumpEntry> {
    let current_slice = navigator.current_index().map(|index| index + 1);
    shortcuts
        .iter()
        .enumerate()
        .map(|(position, &slice)| QuickJumpEntry {
            index: position + 1,
            slice,
            enabled: navigator.is_ready() && navigator.slice_exists(slice),
            selected: current_slice == Some(slice),
        })
        .collect()
}

pub fn quick_jump_panel<'a>(
    shortcuts: &[usize],
    navigator: &SliceNavigator,
) -> Column<'a, Message> {
    let header = row![
        text("Index").width(Length::FillPortion(1)),
        text("Slice").width(Length::FillPortion(1)),
    ]
    .spacing(12)
    .padding([0, 12]);

    quick_jump_entries(shortcuts, navigator)
        .into_iter()
        .fold(
            column![text("Quick Navigation").size(20), header],
            |table, entry| table.push(jump_row(entry)),
        )
        .spacing(6)
}
