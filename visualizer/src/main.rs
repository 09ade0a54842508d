use iced::{
    time,
    widget::{button, column, row, scrollable, slider, text, text_input, Canvas, Column, Container},
    Alignment, Element, Length, Subscription, Task, Theme,
};
use map::MapCanvas;
use migrationcore::render::{FrameMode, MapView, TimeWindow};
use migrationcore::session::{RenderedView, Session, SessionEvent, ViewMode};
use std::time::Duration;

mod map;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Animal Migration Visualizer".into()
}

fn application_subscription(state: &Visualizer) -> Subscription<Message> {
    if state.session.player().is_playing() {
        time::every(Duration::from_millis(600)).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceChoice {
    Sample,
    Upload,
}

struct Visualizer {
    session: Session,
    source: SourceChoice,
    csv_path: String,
    show_help: bool,
    history: Vec<String>,
    read_error: Option<String>,
}

#[derive(Debug, Clone)]
enum Message {
    SourceChosen(SourceChoice),
    PathChanged(String),
    LoadPath,
    FileRead(Result<(String, Vec<u8>), String>),
    ToggleSubject(String),
    SelectAll,
    ViewChosen(ViewMode),
    IntervalChanged(u32),
    FrameModeChosen(FrameMode),
    FrameScrubbed(u32),
    PlayPause,
    StepBack,
    StepForward,
    Restart,
    ToggleLoop,
    Tick,
    ToggleHelp,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let mut state = Visualizer {
            session: Session::default(),
            source: SourceChoice::Sample,
            csv_path: String::new(),
            show_help: false,
            history: Vec::new(),
            read_error: None,
        };
        state.dispatch(SessionEvent::LoadSample);
        (state, Task::none())
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::SourceChosen(choice) => {
                state.source = choice;
                match choice {
                    SourceChoice::Sample => state.dispatch(SessionEvent::LoadSample),
                    SourceChoice::Upload => {
                        state.session = Session::new(state.session.config().clone());
                        state.push_history("Waiting for a CSV path".into());
                    }
                }
                Task::none()
            }
            Message::PathChanged(path) => {
                state.csv_path = path;
                Task::none()
            }
            Message::LoadPath => {
                let path = state.csv_path.trim().to_string();
                if path.is_empty() {
                    return Task::none();
                }
                Task::perform(read_csv(path), Message::FileRead)
            }
            Message::FileRead(Ok((name, bytes))) => {
                state.dispatch(SessionEvent::LoadCsv { name, bytes });
                Task::none()
            }
            Message::FileRead(Err(err)) => {
                let message = format!("Read error: {err}");
                state.push_history(message.clone());
                state.read_error = Some(message);
                Task::none()
            }
            Message::ToggleSubject(subject_id) => {
                state.dispatch(SessionEvent::ToggleSubject(subject_id));
                Task::none()
            }
            Message::SelectAll => {
                state.dispatch(SessionEvent::SelectAll);
                Task::none()
            }
            Message::ViewChosen(mode) => {
                state.dispatch(SessionEvent::SetViewMode(mode));
                Task::none()
            }
            Message::IntervalChanged(days) => {
                if let Ok(interval) = TimeWindow::days(days) {
                    if interval != state.session.interval() {
                        state.dispatch(SessionEvent::SetInterval(interval));
                    }
                }
                Task::none()
            }
            Message::FrameModeChosen(mode) => {
                state.dispatch(SessionEvent::SetFrameMode(mode));
                Task::none()
            }
            Message::FrameScrubbed(index) => {
                state.session.player_mut().seek(index as usize);
                Task::none()
            }
            Message::PlayPause => {
                state.session.player_mut().toggle();
                Task::none()
            }
            Message::StepBack => {
                state.session.player_mut().step_back();
                Task::none()
            }
            Message::StepForward => {
                state.session.player_mut().step_forward();
                Task::none()
            }
            Message::Restart => {
                state.session.player_mut().restart();
                Task::none()
            }
            Message::ToggleLoop => {
                let player = state.session.player_mut();
                let looping = player.is_looping();
                player.set_looping(!looping);
                Task::none()
            }
            Message::Tick => {
                state.session.player_mut().tick();
                Task::none()
            }
            Message::ToggleHelp => {
                state.show_help = !state.show_help;
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let layout = row![state.sidebar(), state.main_panel()]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn sidebar(&self) -> Element<'_, Message> {
        let session = &self.session;

        let mut source_column = column![
            text("Data source").size(18),
            row![
                button(text(checked_label(self.source == SourceChoice::Sample, "Sample dataset")))
                    .on_press(Message::SourceChosen(SourceChoice::Sample))
                    .padding(6),
                button(text(checked_label(self.source == SourceChoice::Upload, "Upload CSV")))
                    .on_press(Message::SourceChosen(SourceChoice::Upload))
                    .padding(6),
            ]
            .spacing(6),
        ]
        .spacing(8);

        if self.source == SourceChoice::Upload {
            source_column = source_column.push(
                row![
                    text_input("Path to Movebank CSV export", &self.csv_path)
                        .on_input(Message::PathChanged)
                        .on_submit(Message::LoadPath)
                        .padding(6),
                    button("Load").on_press(Message::LoadPath).padding(6),
                ]
                .spacing(6),
            );
        }

        let subject_list = session.subjects().iter().fold(
            Column::new().spacing(4),
            |col, subject_id| {
                col.push(
                    button(text(checked_label(
                        session.is_selected(subject_id),
                        subject_id,
                    )))
                    .on_press(Message::ToggleSubject(subject_id.clone()))
                    .width(Length::Fill)
                    .padding(4),
                )
            },
        );

        let counters = session.counters();
        let history_list = if self.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            self.history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        column![
            text("Animal Migration Visualizer").size(26),
            source_column,
            text(format!("Total animals: {}", session.subjects().len())).size(16),
            row![
                text("Select animal(s) to display").size(14),
                button("All").on_press(Message::SelectAll).padding(4),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
            scrollable(subject_list).height(Length::Fixed(220.0)),
            text(self.notice_line()).size(14),
            text(format!(
                "{} loads, {} records, {} skipped rows, {} renders",
                counters.loads(),
                counters.records_parsed(),
                counters.rows_skipped(),
                counters.renders()
            ))
            .size(12),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
            button("How to use this app")
                .on_press(Message::ToggleHelp)
                .padding(6),
            self.help(),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(340.0))
        .into()
    }

    fn help(&self) -> Element<'_, Message> {
        if !self.show_help {
            return Column::new().into();
        }
        column![
            text("1. Use the bundled sample (Arctic fox, Karupelv, Greenland) or load a Movebank CSV export.").size(12),
            text("2. Toggle animal IDs to filter the tracks; an empty selection shows everyone.").size(12),
            text("3. Switch between the static map and the animated map.").size(12),
            text("4. Adjust the frame interval to smooth or accelerate playback.").size(12),
        ]
        .spacing(4)
        .padding(6)
        .into()
    }

    fn main_panel(&self) -> Element<'_, Message> {
        let session = &self.session;
        let mode = session.view_mode();

        let view_choice = row![
            text("Choose view:").size(16),
            button(text(checked_label(mode == ViewMode::Static, "Static Map")))
                .on_press(Message::ViewChosen(ViewMode::Static))
                .padding(6),
            button(text(checked_label(mode == ViewMode::Animated, "Animated Map")))
                .on_press(Message::ViewChosen(ViewMode::Animated))
                .padding(6),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let body: Element<'_, Message> = match session.rendered() {
            None => text(self.notice_line()).size(18).into(),
            Some(RenderedView::Static(view)) => column![
                text("Static Migration Paths").size(22),
                map_canvas(view, &[]),
                legend(view),
            ]
            .spacing(10)
            .into(),
            Some(RenderedView::Animated(timeline)) => {
                let days = session
                    .interval()
                    .whole_days()
                    .unwrap_or(7)
                    .clamp(TimeWindow::MIN_DAYS, TimeWindow::MAX_DAYS);
                let frame_mode = session.frame_mode();
                let player = session.player();

                let controls = column![
                    text(format!("Frame interval (days): {days}")).size(14),
                    slider(
                        TimeWindow::MIN_DAYS..=TimeWindow::MAX_DAYS,
                        days,
                        Message::IntervalChanged
                    ),
                    row![
                        button(text(checked_label(
                            frame_mode == FrameMode::Cumulative,
                            "Cumulative"
                        )))
                        .on_press(Message::FrameModeChosen(FrameMode::Cumulative))
                        .padding(4),
                        button(text(checked_label(frame_mode == FrameMode::Windowed, "Windowed")))
                            .on_press(Message::FrameModeChosen(FrameMode::Windowed))
                            .padding(4),
                    ]
                    .spacing(6),
                ]
                .spacing(6);

                let mut animation = column![text("Animated Migration").size(22), controls]
                    .spacing(10);

                match session.current_frame() {
                    Some(frame) => {
                        animation = animation
                            .push(text(format!(
                                "Frame {} / {}: {}",
                                frame.index + 1,
                                timeline.len(),
                                frame.label
                            ))
                            .size(16))
                            .push(map_canvas(&frame.view, &frame.positions))
                            .push(legend(&frame.view));
                        if timeline.len() > 1 {
                            let last = u32::try_from(timeline.len() - 1).unwrap_or(u32::MAX);
                            let current = u32::try_from(frame.index).unwrap_or(last);
                            animation = animation.push(slider(
                                0..=last,
                                current,
                                Message::FrameScrubbed,
                            ));
                        }
                        animation = animation.push(
                            row![
                                button("<").on_press(Message::StepBack).padding(6),
                                button(if player.is_playing() { "Pause" } else { "Play" })
                                    .on_press(Message::PlayPause)
                                    .padding(6),
                                button(">").on_press(Message::StepForward).padding(6),
                                button("Restart").on_press(Message::Restart).padding(6),
                                button(text(checked_label(player.is_looping(), "Loop")))
                                    .on_press(Message::ToggleLoop)
                                    .padding(6),
                            ]
                            .spacing(6),
                        );
                    }
                    None => {
                        animation = animation
                            .push(text(&session.notice().message).size(16))
                            .push(map_canvas(&MapView::placeholder(), &[]));
                    }
                }
                animation.into()
            }
        };

        column![view_choice, body]
            .spacing(14)
            .padding(16)
            .width(Length::Fill)
            .into()
    }

    fn notice_line(&self) -> String {
        match &self.read_error {
            Some(message) => format!("Error: {message}"),
            None => {
                let notice = self.session.notice();
                format!("{:?}: {}", notice.level, notice.message)
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        self.read_error = None;
        if let Err(err) = self.session.apply(event) {
            log::debug!("session event failed: {}", err);
        }
        let entry = self.session.notice().message.clone();
        self.push_history(entry);
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn checked_label(checked: bool, label: &str) -> String {
    format!("{} {}", if checked { "[x]" } else { "[ ]" }, label)
}

fn map_canvas<'a>(
    view: &MapView,
    positions: &[migrationcore::render::Marker],
) -> Element<'a, Message> {
    Canvas::new(MapCanvas::new(view, positions))
        .width(Length::Fill)
        .height(Length::Fixed(560.0))
        .into()
}

fn legend<'a>(view: &MapView) -> Element<'a, Message> {
    if view.is_empty() {
        return text("No data to display.").size(14).into();
    }
    view.layers
        .iter()
        .fold(row![].spacing(14), |row, layer| {
            row.push(
                text(format!("{} {}", layer.color, layer.tooltip))
                    .size(13)
                    .color(iced::Color::from_rgb8(
                        layer.color.r,
                        layer.color.g,
                        layer.color.b,
                    )),
            )
        })
        .into()
}

async fn read_csv(path: String) -> Result<(String, Vec<u8>), String> {
    tokio::fs::read(&path)
        .await
        .map(|bytes| (path.clone(), bytes))
        .map_err(|err| format!("{}: {}", path, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failure_replaces_the_notice_until_next_event() {
        let (mut state, _) = Visualizer::boot();
        let _ = Visualizer::update(&mut state, Message::SourceChosen(SourceChoice::Upload));
        assert!(state.notice_line().contains("Awaiting CSV upload."));

        let _ = Visualizer::update(
            &mut state,
            Message::FileRead(Err("missing.csv: No such file or directory".into())),
        );
        assert_eq!(
            state.notice_line(),
            "Error: Read error: missing.csv: No such file or directory"
        );

        let _ = Visualizer::update(&mut state, Message::SourceChosen(SourceChoice::Sample));
        assert!(state.notice_line().starts_with("Info: Showing"));
    }
}
