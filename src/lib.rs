//! # Znayka Telegram Bot
//!
//! A Telegram bot that answers questions submitted as text or photos.
//! Photos are pre-processed, run through Tesseract OCR, and the recognized
//! text is resolved through an ordered fallback chain of information sources.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod history;
pub mod instance_manager;
pub mod localization;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod pipeline;
pub mod preprocess;
pub mod reminder;
pub mod sources;
pub mod weather;
