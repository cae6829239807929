use crate::libquizzical::question::{AnswerOption, OptionId};
use crate::libquizzical::session::{Effect, Event, QuizSession, Stage};
use crate::libquizzical::shake::{ShakeSignal, SystemClock};
use crate::libquizzical::trivia::{
    category_name, fetch_quiz, CustomizeSelection, Difficulty, TriviaSource, CATEGORIES,
};
use crate::Error;
use eframe::egui;
use eframe::egui::{Button, Color32, RichText, ScrollArea, Stroke, Ui};
use log::debug;
use std::f32::consts::TAU;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

const SELECTED_FILL: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
const SELECTED_TEXT: Color32 = Color32::from_rgb(0xF5, 0xF7, 0xFB);
const CORRECT_FILL: Color32 = Color32::from_rgb(0x7E, 0xE6, 0x95);
const INCORRECT_FILL: Color32 = Color32::from_rgb(0xFA, 0x8E, 0x8E);
const INCORRECT_TEXT: Color32 = Color32::from_rgb(0x54, 0x5E, 0x94);
const DIMMED: Color32 = Color32::from_rgb(0x8F, 0x96, 0xBD);
const DEFAULT_TEXT: Color32 = Color32::from_rgb(0x29, 0x32, 0x64);

type SharedSource = Arc<dyn TriviaSource + Send + Sync>;

struct QuizApp {
    session: QuizSession,
    form: CustomizeSelection,
    shake: ShakeSignal<SystemClock>,
    source: SharedSource,

    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl QuizApp {
    fn new(cc: &eframe::CreationContext, source: SharedSource, session: QuizSession) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        let (sender, receiver) = channel();

        Self {
            form: session.selection(),
            session,
            shake: ShakeSignal::new(SystemClock),
            source,

            sender,
            receiver,
        }
    }

    fn handle(&mut self, ctx: &egui::Context, event: Event) {
        match self.session.dispatch(event) {
            Some(Effect::Fetch { ticket, request }) => {
                self.shake.clear();
                let source = Arc::clone(&self.source);
                let sender = self.sender.clone();
                let ctx = ctx.clone();
                thread::spawn(move || {
                    let event = Event::from_fetch(ticket, fetch_quiz(source.as_ref(), &request));
                    if sender.send(event).is_err() {
                        debug!("[GUI] Window closed before fetch {:?} finished", ticket);
                    }
                    ctx.request_repaint();
                });
            }
            Some(Effect::Shake) => self.shake.fire(),
            None => {}
        }
    }

    fn draw_intro(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.label(RichText::new("Quizzical").size(40.0).strong());
            ui.label(RichText::new("How much do you know?").size(16.0));
            ui.add_space(24.0);
            if ui.button(RichText::new("Start").size(18.0)).clicked() {
                self.handle(ctx, Event::StartQuiz);
            }
        });
    }

    fn draw_customize(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        ui.heading("Customize your quiz");
        ui.add_space(12.0);

        egui::ComboBox::from_label("Category")
            .selected_text(category_name(self.form.category).unwrap_or("Unknown"))
            .show_ui(ui, |ui| {
                for (id, name) in CATEGORIES {
                    ui.selectable_value(&mut self.form.category, *id, *name);
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Difficulty:");
            for difficulty in Difficulty::ALL {
                ui.radio_value(&mut self.form.difficulty, Some(difficulty), difficulty.as_str());
            }
        });

        if let Some(reason) = self.session.fetch_error() {
            ui.add_space(8.0);
            ui.colored_label(
                Color32::from_rgb(0xC0, 0x60, 0x00),
                format!("Couldn't load questions: {}. Try again.", reason),
            );
        }

        ui.add_space(16.0);
        if shaking_button(ui, &mut self.shake, "Start quiz") {
            self.handle(ctx, Event::SubmitCustomize(self.form));
        }
    }

    fn draw_quiz(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        let ended = self.session.stage() == Stage::Ended;
        let mut clicked: Option<(usize, OptionId, String)> = None;

        ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
            for (idx, question) in self.session.questions().iter().enumerate() {
                ui.push_id(question.id, |ui| {
                    ui.label(RichText::new(&question.question_text).size(18.0).strong());
                    ui.horizontal_wrapped(|ui| {
                        for option in &question.answer_options {
                            if ui.add(option_button(option, ended)).clicked() {
                                clicked = Some((idx, option.id, option.answer_text.clone()));
                            }
                        }
                    });
                });
                ui.separator();
            }

            ui.add_space(12.0);
            if ended {
                let score = self.session.score().unwrap_or(0);
                ui.horizontal(|ui| {
                    ui.label(format!(
                        "You scored {}/{} correct answers",
                        score,
                        self.session.questions().len()
                    ));
                    if ui.button("Play again").clicked() {
                        self.form = self.session.selection();
                        self.handle(ctx, Event::PlayAgain);
                    }
                });
            } else if shaking_button(ui, &mut self.shake, "Check answers") {
                self.handle(ctx, Event::CheckAnswers);
            }
        });

        if let Some((question_index, option_id, answer_text)) = clicked {
            self.handle(
                ctx,
                Event::SelectAnswer {
                    question_index,
                    option_id,
                    answer_text,
                },
            );
        }
    }
}

fn option_button(option: &AnswerOption, ended: bool) -> Button<'static> {
    let (fill, text, stroke) = if option.is_incorrect {
        (INCORRECT_FILL, INCORRECT_TEXT, INCORRECT_FILL)
    } else if option.is_correct {
        (CORRECT_FILL, DEFAULT_TEXT, CORRECT_FILL)
    } else if ended {
        (Color32::TRANSPARENT, DIMMED, DIMMED)
    } else if option.is_selected {
        (SELECTED_FILL, SELECTED_TEXT, SELECTED_FILL)
    } else {
        (Color32::TRANSPARENT, DEFAULT_TEXT, DEFAULT_TEXT)
    };
    Button::new(RichText::new(option.answer_text.clone()).color(text))
        .fill(fill)
        .stroke(Stroke::new(1.0, stroke))
}

/// A button that wiggles sideways while `shake` is active.
fn shaking_button(ui: &mut Ui, shake: &mut ShakeSignal<SystemClock>, text: &str) -> bool {
    let offset = match shake.phase() {
        Some(phase) => {
            ui.ctx().request_repaint();
            (phase * TAU * 4.0).sin() * 6.0
        }
        None => 0.0,
    };
    ui.horizontal(|ui| {
        ui.add_space(8.0 + offset);
        ui.button(text).clicked()
    })
    .inner
}

impl eframe::App for QuizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.receiver.try_recv() {
            self.handle(ctx, event);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.is_loading() {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }
            match self.session.stage() {
                Stage::Intro => self.draw_intro(ctx, ui),
                Stage::Customizing => self.draw_customize(ctx, ui),
                Stage::InProgress | Stage::Ended => self.draw_quiz(ctx, ui),
            }
        });
    }
}

pub fn init_gui(source: SharedSource, session: QuizSession) -> Result<(), Error> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Quizzical",
        native_options,
        Box::new(move |cc| Ok(Box::new(QuizApp::new(cc, source, session)))),
    )?;

    Ok(())
}
