use crate::message::Message;
use crate::navigator::{Phase, SliceNavigator, INIT_FAILURE_MESSAGE};
use iced::widget::text::Wrapping;
use iced::widget::{button, column, container, mouse_area, row, text, Image};
use iced::{Alignment, Element, Length};

pub fn viewport_panel(navigator: &SliceNavigator) -> Element<'_, Message> {
    let body: Element<'_, Message> = match navigator.phase() {
        Phase::Uninitialized => text("Open DICOM files to start viewing slices").into(),
        Phase::Loading => text("Loading DICOM images...").size(18).into(),
        Phase::Error => error_panel(navigator.error_message().unwrap_or(INIT_FAILURE_MESSAGE)),
        Phase::Ready => match navigator.viewport().image() {
            Some(image) => Image::new(image.handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("No frame available").into(),
        },
    };

    let area = mouse_area(
        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Alignment::Center)
            .align_y(Alignment::Center),
    )
    .on_scroll(Message::WheelScrolled);

    let mut content = column![area].spacing(12).align_x(Alignment::Center);

    if let (true, Some(index)) = (navigator.is_ready(), navigator.current_index()) {
        let position = format!("Slice: {}/{}", index + 1, navigator.len());
        let mut counter = row![text(position).size(16)].spacing(16);
        if let Some(image) = navigator.viewport().image() {
            counter = counter.push(text(format!("{} x {}", image.width, image.height)).size(14));
        }
        content = content.push(counter);
    }

    if let Some(failure) = navigator.navigation_error() {
        content = content.push(
            row![
                text(format!(
                    "Failed to load slice {}: {}",
                    failure.slice_number, failure.message
                ))
                .wrapping(Wrapping::Word),
                button("Dismiss").on_press(Message::DismissNotice),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        );
    }

    content.into()
}

fn error_panel(message: &str) -> Element<'_, Message> {
    column![
        text("⚠").size(32),
        text(message).wrapping(Wrapping::Word),
        button("Retry").on_press(Message::Retry),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}
