use crate::libquizzical::formatter::decode;
use log::debug;
use rand::{rng, Rng};
use serde::Deserialize;
use std::fmt;
use uuid::Uuid;

/// Number of slots a well-formed question offers: one correct answer and three incorrect ones.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionId(Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionId(Uuid);

impl QuestionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl OptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the trivia API's `results` array, still entity-escaped.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawQuestion {
    #[serde(default)]
    pub category: String,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOption {
    pub id: OptionId,
    pub answer_text: String,
    pub is_selected: bool,
    pub is_correct: bool,
    pub is_incorrect: bool,
}

impl AnswerOption {
    fn new(answer_text: String) -> Self {
        Self {
            id: OptionId::new(),
            answer_text,
            is_selected: false,
            is_correct: false,
            is_incorrect: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub category: String,
    pub question_text: String,
    pub correct_answer: String,
    pub answer_options: Vec<AnswerOption>,
}

impl Question {
    pub fn build(raw: RawQuestion) -> Question {
        Self::build_with(raw, &mut rng())
    }

    /// Normalises a raw record: every string is decoded and the correct answer is inserted among
    /// the incorrect ones at an index drawn uniformly from `0..4`. A short `incorrect_answers`
    /// list simply yields fewer options.
    pub fn build_with<R: Rng>(raw: RawQuestion, rng: &mut R) -> Question {
        let correct_answer = decode(&raw.correct_answer);
        let mut answers: Vec<String> = raw.incorrect_answers.iter().map(|a| decode(a)).collect();

        let slot = rng.random_range(0..OPTIONS_PER_QUESTION).min(answers.len());
        answers.insert(slot, correct_answer.clone());
        debug!("[Quiz] Correct answer placed at slot {}", slot);

        Question {
            id: QuestionId::new(),
            category: decode(&raw.category),
            question_text: decode(&raw.question),
            correct_answer,
            answer_options: answers.into_iter().map(AnswerOption::new).collect(),
        }
    }

    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.answer_options.iter().find(|o| o.id == id)
    }

    /// Applies `f` to every option of this question in place.
    pub fn update_options<F: FnMut(&mut AnswerOption)>(&mut self, f: F) {
        self.answer_options.iter_mut().for_each(f);
    }

    /// Makes `id` the only selected option. Returns `false` (and changes nothing) when the
    /// question has no such option.
    pub fn select(&mut self, id: OptionId) -> bool {
        if self.option(id).is_none() {
            return false;
        }
        self.update_options(|option| option.is_selected = option.id == id);
        true
    }

    /// Sets the correctness highlights from the current selection. Running it again with the same
    /// selection produces the same flags.
    pub fn mark_results(&mut self) {
        let correct_answer = self.correct_answer.clone();
        self.update_options(|option| {
            let is_correct_answer = option.answer_text == correct_answer;
            option.is_correct = is_correct_answer;
            option.is_incorrect = option.is_selected && !is_correct_answer;
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_log::test;

    pub(crate) fn raw(question: &str, correct: &str, incorrect: &[&str]) -> RawQuestion {
        RawQuestion {
            category: "General Knowledge".to_string(),
            question: question.to_string(),
            correct_answer: correct.to_string(),
            incorrect_answers: incorrect.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn built_question_has_four_options_and_one_correct() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let question = Question::build_with(raw("Q?", "A", &["B", "C", "D"]), &mut rng);
            assert_eq!(question.answer_options.len(), 4);
            let correct = question
                .answer_options
                .iter()
                .filter(|o| o.answer_text == question.correct_answer)
                .count();
            assert_eq!(correct, 1);
            assert!(question
                .answer_options
                .iter()
                .all(|o| !o.is_selected && !o.is_correct && !o.is_incorrect));
        }
    }

    #[test]
    fn correct_answer_lands_in_every_slot() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; OPTIONS_PER_QUESTION];
        for _ in 0..400 {
            let question = Question::build_with(raw("Q?", "A", &["B", "C", "D"]), &mut rng);
            let slot = question
                .answer_options
                .iter()
                .position(|o| o.answer_text == "A")
                .unwrap();
            seen[slot] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn incorrect_answers_keep_their_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let question = Question::build_with(raw("Q?", "A", &["B", "C", "D"]), &mut rng);
        let rest: Vec<&str> = question
            .answer_options
            .iter()
            .map(|o| o.answer_text.as_str())
            .filter(|a| *a != "A")
            .collect();
        assert_eq!(rest, vec!["B", "C", "D"]);
    }

    #[test]
    fn text_is_decoded() {
        let question = Question::build(raw(
            "What is &quot;Pok&eacute;mon&quot; short for?",
            "Pocket Monsters",
            &["Poke Men", "Pocket Mons", "Poking Monkeys"],
        ));
        assert_eq!(question.question_text, "What is \"Pokémon\" short for?");
        assert_eq!(question.correct_answer, "Pocket Monsters");
    }

    #[test]
    fn short_incorrect_list_is_not_padded() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let question = Question::build_with(raw("True?", "True", &["False"]), &mut rng);
            assert_eq!(question.answer_options.len(), 2);
        }
    }

    #[test]
    fn ids_are_unique() {
        let question = Question::build(raw("Q?", "A", &["B", "C", "D"]));
        let other = Question::build(raw("Q?", "A", &["B", "C", "D"]));
        assert_ne!(question.id, other.id);
        let mut ids: Vec<OptionId> = question.answer_options.iter().map(|o| o.id).collect();
        ids.extend(other.answer_options.iter().map(|o| o.id));
        let count = ids.len();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn select_keeps_a_single_selection() {
        let mut question = Question::build(raw("Q?", "A", &["B", "C", "D"]));
        let first = question.answer_options[1].id;
        let second = question.answer_options[2].id;
        assert!(question.select(first));
        assert!(question.select(second));
        let selected: Vec<OptionId> = question
            .answer_options
            .iter()
            .filter(|o| o.is_selected)
            .map(|o| o.id)
            .collect();
        assert_eq!(selected, vec![second]);
    }

    #[test]
    fn selecting_a_foreign_option_is_ignored() {
        let mut question = Question::build(raw("Q?", "A", &["B", "C", "D"]));
        let other = Question::build(raw("Q?", "A", &["B", "C", "D"]));
        let kept = question.answer_options[0].id;
        question.select(kept);
        assert!(!question.select(other.answer_options[0].id));
        let selected: Vec<OptionId> = question
            .answer_options
            .iter()
            .filter(|o| o.is_selected)
            .map(|o| o.id)
            .collect();
        assert_eq!(selected, vec![kept]);
    }

    #[test]
    fn mark_results_is_idempotent() {
        let mut question = Question::build(raw("Q?", "A", &["B", "C", "D"]));
        let wrong = question
            .answer_options
            .iter()
            .find(|o| o.answer_text == "C")
            .unwrap()
            .id;
        question.select(wrong);
        question.mark_results();
        let once = question.answer_options.clone();
        question.mark_results();
        assert_eq!(question.answer_options, once);

        for option in &question.answer_options {
            assert_eq!(option.is_correct, option.answer_text == "A");
            assert_eq!(option.is_incorrect, option.answer_text == "C");
        }
    }
}
