//! Yes/no confirmation collaborator.

/// Question asked before the whole list is discarded.
pub const CLEAR_ALL_PROMPT: &str = "Tem certeza que deseja limpar todos os itens do inventário?";

/// Asks the user a yes/no question.
pub trait Confirm {
    fn ask(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn ask(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Answers every question the same way (e.g. a `--yes` flag).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn ask(&mut self, _message: &str) -> bool {
        self.0
    }
}
