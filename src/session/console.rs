use std::io;

use ansi_term::{Colour, Style};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// The terminal as seen by the session: one line in, lines out.
#[async_trait]
pub trait Console: Send {
    /// Reads the next line without its line ending. `None` once input is closed.
    async fn read_line(&mut self) -> io::Result<Option<String>>;

    fn say(&mut self, text: &str);

    /// Headings and banners.
    fn title(&mut self, text: &str) {
        self.say(text);
    }

    /// Single line report of something that went wrong.
    fn error(&mut self, text: &str);
}

pub struct TerminalConsole {
    lines: Lines<BufReader<Stdin>>,
    colored: bool,
}

impl TerminalConsole {
    pub fn new(colored: bool) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            colored,
        }
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }

    fn title(&mut self, text: &str) {
        if self.colored {
            println!("{}", Style::new().bold().paint(text));
        } else {
            println!("{text}");
        }
    }

    fn error(&mut self, text: &str) {
        if self.colored {
            println!("{}", Colour::Red.paint(text));
        } else {
            println!("{text}");
        }
    }
}
