use crate::message::Message;
use crate::views::quick_jump::QuickJumpEntry;
use iced::widget::button::{Button, Status, Style};
use iced::widget::{button, row, text};
use iced::{Background, Color, Length, Shadow, Theme};

pub fn jump_row(entry: QuickJumpEntry) -> Button<'static, Message> {
    let cells = row![
        text(entry.index.to_string()).width(Length::FillPortion(1)),
        text(entry.slice.to_string()).width(Length::FillPortion(1)),
    ]
    .spacing(12);

    button(cells)
        .width(Length::Fill)
        .padding([6, 12])
        .on_press_maybe(
            entry
                .enabled
                .then_some(Message::JumpToSlice(entry.slice)),
        )
        .style(move |theme, status| jump_row_style(theme, status, entry.selected))
}

fn jump_row_style(theme: &Theme, status: Status, is_selected: bool) -> Style {
    let palette = theme.extended_palette();

    let mut background_color = if is_selected {
        palette.primary.strong.color
    } else {
        palette.background.strong.color.scale_alpha(0.4)
    };

    match status {
        Status::Hovered => {
            background_color = if is_selected {
                palette.primary.base.color
            } else {
                palette.background.base.color.scale_alpha(0.8)
            };
        }
        Status::Pressed => {
            background_color = background_color.scale_alpha(0.9);
        }
        Status::Disabled => {
            background_color = background_color.scale_alpha(0.5);
        }
        Status::Active => {}
    }

    let text_color = match (is_selected, status) {
        (true, _) => palette.primary.strong.text,
        (false, Status::Disabled) => palette.background.base.text.scale_alpha(0.4),
        (false, _) => palette.background.base.text,
    };

    Style {
        background: Some(Background::Color(background_color)),
        text_color,
        border: iced::border::Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: iced::border::Radius::new(6.0),
        },
        shadow: Shadow::default(),
    }
}
