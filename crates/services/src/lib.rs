#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod high_score_service;
pub mod question_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, GameServiceError, LoadError};
pub use high_score_service::HighScoreService;
pub use question_service::QuestionService;

pub use sessions::{GameLoopService, GameSession, SessionSnapshot, SessionStep, run_ticker};
