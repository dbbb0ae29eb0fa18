pub mod prompter;

pub use prompter::ConsolePrompter;
