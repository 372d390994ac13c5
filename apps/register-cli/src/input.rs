//! Operator input parsing.

/// One line typed at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Pay,
    Reset,
    /// Print the current snapshot as JSON.
    Json,
    Quit,
    /// Anything else is what the camera "saw".
    Code(String),
    Blank,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Input::Blank,
            "start" => Input::Start,
            "pay" => Input::Pay,
            "reset" | "next" => Input::Reset,
            "json" => Input::Json,
            "quit" | "exit" => Input::Quit,
            _ => Input::Code(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}
