use std::io::{self, BufRead, Write};

/// Outcome of a numbered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// 1-based index into the presented list.
    Selected(usize),
    Quit,
}

/// Line-oriented prompts over an injected reader and writer. Production uses
/// stdin/stdout; tests script the input with a cursor.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Prompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// Renders a 1-based numbered menu and keeps asking until the answer is a
    /// number in range or the quit token. Bad input reprompts, it never
    /// escapes as an error. End of input counts as quitting.
    pub fn choose(&mut self, heading: &str, labels: &[String]) -> io::Result<Choice> {
        loop {
            writeln!(self.output, "{}", heading)?;
            for (index, label) in labels.iter().enumerate() {
                writeln!(self.output, "{}. {}", index + 1, label)?;
            }
            write!(self.output, "Enter a number (or 'q' to quit): ")?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(Choice::Quit),
            };
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                return Ok(Choice::Quit);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=labels.len()).contains(&n) => return Ok(Choice::Selected(n)),
                Ok(_) => writeln!(
                    self.output,
                    "Please pick a number between 1 and {}.",
                    labels.len()
                )?,
                Err(_) => writeln!(self.output, "Invalid input. Enter a number or 'q' to quit.")?,
            }
        }
    }

    /// Yes/no question accepting y/yes/n/no in any case, reprompting on
    /// anything else. End of input counts as no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            write!(self.output, "{} (y/n): ", question)?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(false),
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        Ok(if read == 0 { None } else { Some(line) })
    }
}
