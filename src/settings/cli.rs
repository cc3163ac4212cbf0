use super::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    /// Wipe every stored session and exit.
    #[arg(long)]
    pub clear_sessions: bool,
}
