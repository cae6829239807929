use crate::libquizzical::question::{OptionId, Question};
use crate::libquizzical::trivia::{CustomizeSelection, FetchError, QuizRequest};
use log::{debug, info, warn};
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Intro,
    Customizing,
    InProgress,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAnswer {
    pub question_index: usize,
    pub answer: String,
}

/// Identifies one fetch. Only the resolution carrying the latest ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone)]
pub enum Event {
    StartQuiz,
    SubmitCustomize(CustomizeSelection),
    QuestionsLoaded {
        ticket: FetchTicket,
        questions: Vec<Question>,
    },
    FetchFailed {
        ticket: FetchTicket,
        reason: String,
    },
    SelectAnswer {
        question_index: usize,
        option_id: OptionId,
        answer_text: String,
    },
    CheckAnswers,
    PlayAgain,
}

impl Event {
    /// Turns the outcome of running an [`Effect::Fetch`] into the event that settles it.
    pub fn from_fetch(ticket: FetchTicket, result: Result<Vec<Question>, FetchError>) -> Event {
        match result {
            Ok(questions) => Event::QuestionsLoaded { ticket, questions },
            Err(err) => Event::FetchFailed {
                ticket,
                reason: err.to_string(),
            },
        }
    }
}

/// Work a transition asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the request and feed the outcome back as `QuestionsLoaded` or `FetchFailed`.
    Fetch {
        ticket: FetchTicket,
        request: QuizRequest,
    },
    /// The submission was incomplete; wiggle the button.
    Shake,
}

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    stage: Stage,
    questions: Vec<Question>,
    selected_answers: Vec<SelectedAnswer>,
    score: usize,
    selection: CustomizeSelection,
    pending: Option<FetchTicket>,
    next_ticket: u64,
    fetch_error: Option<String>,
}

impl QuizSession {
    /// A fresh session whose customize form starts out filled with `selection`.
    pub fn with_selection(selection: CustomizeSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selected_answers(&self) -> &[SelectedAnswer] {
        &self.selected_answers
    }

    /// Only meaningful once the quiz has ended.
    pub fn score(&self) -> Option<usize> {
        (self.stage == Stage::Ended).then_some(self.score)
    }

    pub fn selection(&self) -> CustomizeSelection {
        self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn all_answered(&self) -> bool {
        self.selected_answers.len() == self.questions.len()
    }

    /// Applies one event. Never fails: a rejected event leaves the session as it was, optionally
    /// asking for a [`Effect::Shake`].
    pub fn update(mut self, event: Event) -> (QuizSession, Option<Effect>) {
        let effect = match event {
            Event::StartQuiz => {
                if self.stage == Stage::Intro {
                    self.stage = Stage::Customizing;
                }
                None
            }
            Event::SubmitCustomize(selection) => self.submit_customize(selection),
            Event::QuestionsLoaded { ticket, questions } => {
                if self.take_pending(ticket) {
                    self.load(questions);
                }
                None
            }
            Event::FetchFailed { ticket, reason } => {
                if self.take_pending(ticket) {
                    warn!("[Quiz] Staying on customize after failed fetch: {}", reason);
                    self.fetch_error = Some(reason);
                }
                None
            }
            Event::SelectAnswer {
                question_index,
                option_id,
                answer_text,
            } => {
                self.select_answer(question_index, option_id, answer_text);
                None
            }
            Event::CheckAnswers => self.check_answers(),
            Event::PlayAgain => {
                if self.stage == Stage::Ended {
                    self.questions.clear();
                    self.selected_answers.clear();
                    self.score = 0;
                    self.stage = Stage::Customizing;
                    info!("[Quiz] Playing again");
                }
                None
            }
        };
        (self, effect)
    }

    /// In-place form of [`QuizSession::update`].
    pub fn dispatch(&mut self, event: Event) -> Option<Effect> {
        let (next, effect) = mem::take(self).update(event);
        *self = next;
        effect
    }

    fn submit_customize(&mut self, selection: CustomizeSelection) -> Option<Effect> {
        if self.stage != Stage::Customizing {
            return None;
        }
        self.selection = selection;
        let Some(request) = selection.request() else {
            debug!("[Quiz] Customize submitted without a difficulty");
            return Some(Effect::Shake);
        };

        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        if let Some(stale) = self.pending.replace(ticket) {
            debug!("[Quiz] Superseding in-flight fetch {:?}", stale);
        }
        self.fetch_error = None;
        info!("[Quiz] Requesting {:?} as {:?}", request, ticket);
        Some(Effect::Fetch { ticket, request })
    }

    fn take_pending(&mut self, ticket: FetchTicket) -> bool {
        if self.pending != Some(ticket) || self.stage != Stage::Customizing {
            debug!("[Quiz] Dropping stale fetch result {:?}", ticket);
            return false;
        }
        self.pending = None;
        true
    }

    fn load(&mut self, questions: Vec<Question>) {
        if questions.is_empty() {
            self.fetch_error = Some("the trivia API returned no questions".to_string());
            return;
        }
        info!("[Quiz] Starting quiz with {} questions", questions.len());
        self.questions = questions;
        self.selected_answers.clear();
        self.score = 0;
        self.stage = Stage::InProgress;
    }

    fn select_answer(&mut self, question_index: usize, option_id: OptionId, answer_text: String) {
        if self.stage != Stage::InProgress {
            return;
        }
        let selected = update_question(&mut self.questions, question_index, |question| {
            question.select(option_id)
        });
        if selected != Some(true) {
            warn!(
                "[Quiz] No option {} in question {}",
                option_id, question_index
            );
            return;
        }
        upsert_answer(
            &mut self.selected_answers,
            SelectedAnswer {
                question_index,
                answer: answer_text,
            },
        );
    }

    fn check_answers(&mut self) -> Option<Effect> {
        if self.stage != Stage::InProgress {
            return None;
        }
        if !self.all_answered() {
            debug!(
                "[Quiz] Check requested with {}/{} answered",
                self.selected_answers.len(),
                self.questions.len()
            );
            return Some(Effect::Shake);
        }

        self.score = self
            .selected_answers
            .iter()
            .filter(|selected| {
                self.questions
                    .get(selected.question_index)
                    .is_some_and(|q| q.correct_answer == selected.answer)
            })
            .count();
        for index in 0..self.questions.len() {
            update_question(&mut self.questions, index, Question::mark_results);
        }
        self.stage = Stage::Ended;
        info!("[Quiz] Scored {}/{}", self.score, self.questions.len());
        None
    }
}

/// Runs `f` on the question at `index`, `None` when there is no such question.
fn update_question<R, F: FnOnce(&mut Question) -> R>(
    questions: &mut [Question],
    index: usize,
    f: F,
) -> Option<R> {
    questions.get_mut(index).map(f)
}

fn upsert_answer(answers: &mut Vec<SelectedAnswer>, answer: SelectedAnswer) {
    match answers
        .iter_mut()
        .find(|a| a.question_index == answer.question_index)
    {
        Some(existing) => existing.answer = answer.answer,
        None => answers.push(answer),
    }
}
