//! PPTX (Office Open XML) export and outline reading for generated decks.
//!
//! A `.pptx` file is a ZIP archive of XML parts; this crate writes one from
//! a list of generated slides and reads the slide text back out of any deck.

pub mod export;
pub mod layout;
pub mod package;
pub mod reader;

pub use export::{ExportFormat, ExportedFile, PresentationExporter};
pub use reader::{DeckOutline, DeckReader, OutlineSlide};
