use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap_derive::ValueEnum)]
pub enum PlayerType {
    Human,
    /// Tree search backed by the statistics store.
    Bot,
    /// Uniformly random legal action.
    Random,
}

impl Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerType::Human => write!(f, "human"),
            PlayerType::Bot => write!(f, "bot"),
            PlayerType::Random => write!(f, "random"),
        }
    }
}
