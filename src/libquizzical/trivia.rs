use crate::libquizzical::question::{Question, RawQuestion};
use log::{debug, error, info};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://opentdb.com/api.php";
pub const QUESTION_COUNT: usize = 5;
pub const DEFAULT_CATEGORY: u32 = 9;

/// Open Trivia Database categories offered on the customize screen.
pub const CATEGORIES: &[(u32, &str)] = &[
    (9, "General Knowledge"),
    (10, "Entertainment: Books"),
    (11, "Entertainment: Film"),
    (12, "Entertainment: Music"),
    (13, "Entertainment: Musicals & Theatres"),
    (14, "Entertainment: Television"),
    (15, "Entertainment: Video Games"),
    (16, "Entertainment: Board Games"),
    (17, "Science & Nature"),
    (18, "Science: Computers"),
    (19, "Science: Mathematics"),
    (20, "Mythology"),
    (21, "Sports"),
    (22, "Geography"),
    (23, "History"),
    (24, "Politics"),
    (25, "Art"),
    (26, "Celebrities"),
    (27, "Animals"),
    (28, "Vehicles"),
    (29, "Entertainment: Comics"),
    (30, "Science: Gadgets"),
    (31, "Entertainment: Japanese Anime & Manga"),
    (32, "Entertainment: Cartoon & Animations"),
];

pub fn category_name(id: u32) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(category, _)| *category == id)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown difficulty {0:?} (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError(other.to_string())),
        }
    }
}

/// What the customize screen holds before it is submitted. `difficulty` stays `None` until the
/// user picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomizeSelection {
    pub category: u32,
    pub difficulty: Option<Difficulty>,
}

impl Default for CustomizeSelection {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY,
            difficulty: None,
        }
    }
}

impl CustomizeSelection {
    pub fn request(&self) -> Option<QuizRequest> {
        self.difficulty.map(|difficulty| QuizRequest {
            category: self.category,
            difficulty,
        })
    }
}

/// A validated selection, ready to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRequest {
    pub category: u32,
    pub difficulty: Difficulty,
}

impl QuizRequest {
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}?amount={}&category={}&difficulty={}",
            base, QUESTION_COUNT, self.category, self.difficulty
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoResults,
    InvalidParameter,
    TokenNotFound,
    TokenEmpty,
    RateLimit,
    Unknown(u8),
}

impl ResponseCode {
    /// `None` for the success code.
    pub fn from_code(code: u8) -> Option<ResponseCode> {
        match code {
            0 => None,
            1 => Some(ResponseCode::NoResults),
            2 => Some(ResponseCode::InvalidParameter),
            3 => Some(ResponseCode::TokenNotFound),
            4 => Some(ResponseCode::TokenEmpty),
            5 => Some(ResponseCode::RateLimit),
            other => Some(ResponseCode::Unknown(other)),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::NoResults => f.write_str("not enough questions for this category and difficulty"),
            ResponseCode::InvalidParameter => f.write_str("the request had an invalid parameter"),
            ResponseCode::TokenNotFound => f.write_str("session token not found"),
            ResponseCode::TokenEmpty => f.write_str("session token has no questions left"),
            ResponseCode::RateLimit => f.write_str("too many requests, wait a few seconds"),
            ResponseCode::Unknown(code) => write!(f, "unexpected response code {}", code),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("trivia API refused the request: {0}")]
    Api(ResponseCode),

    #[error("trivia API returned no questions")]
    NoResults,
}

#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    pub response_code: u8,
    #[serde(default)]
    pub results: Vec<RawQuestion>,
}

impl ApiResponse {
    pub fn into_results(self) -> Result<Vec<RawQuestion>, FetchError> {
        if let Some(code) = ResponseCode::from_code(self.response_code) {
            return Err(FetchError::Api(code));
        }
        if self.results.is_empty() {
            return Err(FetchError::NoResults);
        }
        Ok(self.results)
    }
}

/// Anything that can answer a [`QuizRequest`] with raw trivia records.
pub trait TriviaSource {
    fn fetch(&self, request: &QuizRequest) -> Result<Vec<RawQuestion>, FetchError>;
}

pub struct OpenTdbClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OpenTdbClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl TriviaSource for OpenTdbClient {
    fn fetch(&self, request: &QuizRequest) -> Result<Vec<RawQuestion>, FetchError> {
        let url = request.url(&self.base_url);
        debug!("[Fetch] GET {}", url);
        let response: ApiResponse = self.client.get(&url).send()?.error_for_status()?.json()?;
        response.into_results()
    }
}

/// Fetches and normalises one quiz. Failures are logged here; the caller decides what the user
/// sees.
pub fn fetch_quiz<S: TriviaSource + ?Sized>(
    source: &S,
    request: &QuizRequest,
) -> Result<Vec<Question>, FetchError> {
    let now = Instant::now();
    let raw = source.fetch(request).inspect_err(|err| {
        error!("[Fetch] Fetching {:?} failed: {}", request, err);
    })?;
    let questions: Vec<Question> = raw.into_iter().map(Question::build).collect();
    info!(
        "[Fetch] Loaded {} questions in {} ms.",
        questions.len(),
        now.elapsed().as_millis()
    );
    Ok(questions)
}
