use crate::libquizzical::question::{AnswerOption, Question};
use crate::libquizzical::session::{Effect, Event, QuizSession, Stage};
use crate::libquizzical::trivia::{
    category_name, fetch_quiz, CustomizeSelection, Difficulty, TriviaSource, CATEGORIES,
};
use crate::Error;
use colored::{ColoredString, Colorize};
use log::debug;
use std::io::{Read, Write};
use std::iter::Peekable;
use text_io::try_read;

#[derive(Debug, PartialEq)]
enum Command {
    Select { question: usize, option: usize },
    Check,
    Quit,
    Unknown,
}

impl Command {
    /// Parses `2b` / `2 b` / `2 2` (question 2, second option), `c` and `q`.
    fn from_str(questions: &[Question], input: &str) -> Command {
        match input.trim() {
            "q" | "quit" => Command::Quit,
            "c" | "check" => Command::Check,
            input => {
                let digits: String = input.chars().take_while(|c| c.is_ascii_digit()).collect();
                let rest = input[digits.len()..].trim();
                let Ok(number) = digits.parse::<usize>() else {
                    return Command::Unknown;
                };
                let Some(question) = number.checked_sub(1).filter(|q| *q < questions.len())
                else {
                    return Command::Unknown;
                };
                let option = match rest.parse::<usize>() {
                    Ok(n) => n.checked_sub(1),
                    Err(_) => option_index(rest),
                };
                match option.filter(|o| *o < questions[question].answer_options.len()) {
                    Some(option) => Command::Select { question, option },
                    None => Command::Unknown,
                }
            }
        }
    }
}

fn option_index(letter: &str) -> Option<usize> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => Some((c as u8 - b'a') as usize),
        (Some(c), None) if c.is_ascii_uppercase() => Some((c as u8 - b'A') as usize),
        _ => None,
    }
}

fn option_letter(index: usize) -> char {
    (b'a' + index as u8) as char
}

/// Reads one line (without the newline). `None` once `input` is exhausted.
fn read_line<I: Iterator<Item = u8>>(mut input: &mut Peekable<I>) -> Option<String> {
    if input.peek().is_none() {
        debug!("[CLI] Input closed");
        return None;
    }
    let line: Result<String, _> = try_read!("{}\n", input);
    match line {
        Ok(line) => Some(line.trim().to_string()),
        Err(err) => {
            debug!("[CLI] Unreadable input: {:?}", err);
            None
        }
    }
}

/// `None` on end of input.
fn prompt(message: &str) -> Option<String> {
    print!("{} ", message.cyan());
    std::io::stdout().flush().ok()?;
    let mut stdin = std::io::stdin().bytes().map_while(Result::ok).peekable();
    read_line(&mut stdin)
}

fn styled_option(option: &AnswerOption, ended: bool) -> ColoredString {
    let text = option.answer_text.as_str();
    if option.is_incorrect {
        text.black().on_bright_red()
    } else if option.is_correct {
        text.black().on_bright_green()
    } else if ended {
        text.dimmed()
    } else if option.is_selected {
        text.white().bold().on_bright_black()
    } else {
        text.normal()
    }
}

fn print_questions(session: &QuizSession) {
    let ended = session.stage() == Stage::Ended;
    let total = session.questions().len();
    for (idx, question) in session.questions().iter().enumerate() {
        let leading = format!("{}/{}. ", idx + 1, total);
        println!(
            "{}{} {}",
            leading.cyan(),
            question.question_text.bold(),
            format!("({})", question.category).dimmed()
        );
        let indent = " ".repeat(leading.len());
        for (i, option) in question.answer_options.iter().enumerate() {
            println!(
                "{}{}. {}",
                indent,
                option_letter(i).to_string().bold(),
                styled_option(option, ended)
            );
        }
        println!();
    }
}

fn print_categories(selected: u32) {
    for (id, name) in CATEGORIES {
        let line = format!("{:>4}  {}", id, name);
        if *id == selected {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

/// Asks for category and difficulty, starting from `current`. `None` when the user quits.
fn customize(current: CustomizeSelection) -> Option<CustomizeSelection> {
    let mut selection = current;
    print_categories(selection.category);
    loop {
        let name = category_name(selection.category).unwrap_or("unknown");
        let input = prompt(&format!(
            "Category id (enter for {}, q to quit):",
            name
        ))?;
        match input.as_str() {
            "q" => return None,
            "" => break,
            input => match input.parse::<u32>().ok().filter(|id| category_name(*id).is_some()) {
                Some(id) => {
                    selection.category = id;
                    break;
                }
                None => println!("{}", format!("No category with id {:?}!", input).bright_red()),
            },
        }
    }

    let current = selection
        .difficulty
        .map(|d| format!("enter for {}", d))
        .unwrap_or_else(|| "pick one".to_string());
    let names: Vec<&str> = Difficulty::ALL.iter().map(Difficulty::as_str).collect();
    let input = prompt(&format!("Difficulty ({}, {}):", names.join("/"), current))?;
    match input.as_str() {
        "q" => return None,
        "" => {}
        "e" => selection.difficulty = Some(Difficulty::Easy),
        "m" => selection.difficulty = Some(Difficulty::Medium),
        "h" => selection.difficulty = Some(Difficulty::Hard),
        input => selection.difficulty = input.parse().ok(),
    }
    Some(selection)
}

pub fn cli_loop<S: TriviaSource + ?Sized>(source: &S, mut session: QuizSession) -> Result<(), Error> {
    loop {
        debug!("[CLI] Stage: {:?}", session.stage());
        match session.stage() {
            Stage::Intro => {
                println!("{}", "==========> Quizzical <==========".cyan().bold());
                println!("{}", "How much do you know?".italic());
                let Some(input) = prompt("Press enter to start (q to quit):") else {
                    return Ok(());
                };
                if input == "q" {
                    return Ok(());
                }
                session.dispatch(Event::StartQuiz);
            }
            Stage::Customizing => {
                if let Some(reason) = session.fetch_error() {
                    println!(
                        "{}",
                        format!("Couldn't load questions: {}. Try again!", reason).yellow()
                    );
                }
                let Some(selection) = customize(session.selection()) else {
                    println!("{}", "Quitting Early!".cyan());
                    return Ok(());
                };
                match session.dispatch(Event::SubmitCustomize(selection)) {
                    Some(Effect::Fetch { ticket, request }) => {
                        if session.is_loading() {
                            println!("{}", "Loading questions...".cyan());
                        }
                        let event = Event::from_fetch(ticket, fetch_quiz(source, &request));
                        session.dispatch(event);
                    }
                    Some(Effect::Shake) => {
                        println!("{}", "Pick a difficulty before starting!".bright_red())
                    }
                    None => {}
                }
            }
            Stage::InProgress => {
                print_questions(&session);
                let Some(input) = prompt(
                    "Answer with <question><option> (e.g. 1b), c to check answers, q to quit:",
                ) else {
                    return Ok(());
                };
                match Command::from_str(session.questions(), &input) {
                    Command::Select { question, option } => {
                        let picked = &session.questions()[question].answer_options[option];
                        debug!(
                            "[CLI] Picked {} in question {:?}",
                            picked.id,
                            session.questions()[question].id
                        );
                        let event = Event::SelectAnswer {
                            question_index: question,
                            option_id: picked.id,
                            answer_text: picked.answer_text.clone(),
                        };
                        session.dispatch(event);
                    }
                    Command::Check => {
                        if let Some(Effect::Shake) = session.dispatch(Event::CheckAnswers) {
                            println!(
                                "{}",
                                format!(
                                    "Answer every question first! ({}/{} answered)",
                                    session.selected_answers().len(),
                                    session.questions().len()
                                )
                                .bright_red()
                            );
                        }
                    }
                    Command::Quit => {
                        println!("{}", "Quitting Early!".cyan());
                        return Ok(());
                    }
                    Command::Unknown => {
                        println!("{}", format!("Didn't understand {:?}.", input).bright_red())
                    }
                }
            }
            Stage::Ended => {
                print_questions(&session);
                let score = session.score().unwrap_or(0);
                println!(
                    "{}",
                    format!(
                        "You scored {}/{} correct answers",
                        score,
                        session.questions().len()
                    )
                    .bright_green()
                    .bold()
                );
                let Some(input) = prompt("Play again? (y/n):") else {
                    return Ok(());
                };
                if !matches!(input.as_str(), "y" | "yes") {
                    return Ok(());
                }
                session.dispatch(Event::PlayAgain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libquizzical::question::RawQuestion;
    use test_log::test;

    fn questions() -> Vec<Question> {
        (0..5)
            .map(|i| {
                Question::build(RawQuestion {
                    category: String::new(),
                    question: format!("Q{}", i),
                    correct_answer: "yes".to_string(),
                    incorrect_answers: vec!["no".into(), "maybe".into(), "never".into()],
                })
            })
            .collect()
    }

    #[test]
    fn parses_letter_and_number_options() {
        let questions = questions();
        assert_eq!(
            Command::from_str(&questions, "1b"),
            Command::Select {
                question: 0,
                option: 1
            }
        );
        assert_eq!(
            Command::from_str(&questions, " 5 D "),
            Command::Select {
                question: 4,
                option: 3
            }
        );
        assert_eq!(
            Command::from_str(&questions, "3 1"),
            Command::Select {
                question: 2,
                option: 0
            }
        );
    }

    #[test]
    fn parses_keywords() {
        let questions = questions();
        assert_eq!(Command::from_str(&questions, "c"), Command::Check);
        assert_eq!(Command::from_str(&questions, "check"), Command::Check);
        assert_eq!(Command::from_str(&questions, "q"), Command::Quit);
    }

    #[test]
    fn rejects_out_of_range() {
        let questions = questions();
        assert_eq!(Command::from_str(&questions, "0a"), Command::Unknown);
        assert_eq!(Command::from_str(&questions, "6a"), Command::Unknown);
        assert_eq!(Command::from_str(&questions, "1e"), Command::Unknown);
        assert_eq!(Command::from_str(&questions, "1 0"), Command::Unknown);
        assert_eq!(Command::from_str(&questions, "1"), Command::Unknown);
        assert_eq!(Command::from_str(&questions, "hello"), Command::Unknown);
    }

    #[test]
    fn read_line_stops_at_end_of_input() {
        let mut input = b"1b\nc\nlast".iter().copied().peekable();
        assert_eq!(read_line(&mut input), Some("1b".to_string()));
        assert_eq!(read_line(&mut input), Some("c".to_string()));
        assert_eq!(read_line(&mut input), Some("last".to_string()));
        assert_eq!(read_line(&mut input), None);
        assert_eq!(read_line(&mut input), None);
    }

    #[test]
    fn read_line_on_closed_input_is_none() {
        let mut input = std::iter::empty::<u8>().peekable();
        assert_eq!(read_line(&mut input), None);
    }

    #[test]
    fn read_line_keeps_blank_lines() {
        let mut input = b"\n\n".iter().copied().peekable();
        assert_eq!(read_line(&mut input), Some(String::new()));
        assert_eq!(read_line(&mut input), Some(String::new()));
        assert_eq!(read_line(&mut input), None);
    }

    #[test]
    fn option_letters() {
        assert_eq!(option_letter(0), 'a');
        assert_eq!(option_letter(3), 'd');
        assert_eq!(option_index("c"), Some(2));
        assert_eq!(option_index("B"), Some(1));
        assert_eq!(option_index("ab"), None);
    }
}
