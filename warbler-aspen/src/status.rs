use colored::*;

/// Width of the right-aligned tag column.
const GUTTER: usize = 12;

pub enum Kind {
    Info,
    Success,
    Note,
    Warn,
    Fatal,
}

/// A coloured, right-aligned tag in front of a message on stderr.
pub struct Status(pub Kind, pub &'static str);

impl Status {
    pub fn info() -> Status {
        Status(Kind::Info, "Info")
    }
    pub fn success() -> Status {
        Status(Kind::Success, "Success")
    }
    pub fn note() -> Status {
        Status(Kind::Note, "Note")
    }
    pub fn warn() -> Status {
        Status(Kind::Warn, "Warning")
    }
    pub fn fatal() -> Status {
        Status(Kind::Fatal, "Fatal")
    }

    fn tag(&self) -> ColoredString {
        match self.0 {
            Kind::Info => self.1.blue(),
            Kind::Success => self.1.green(),
            Kind::Note => self.1.cyan(),
            Kind::Warn => self.1.yellow(),
            Kind::Fatal => self.1.red(),
        }
        .bold()
    }

    /// Compiler errors carry source excerpts,
    /// so they're printed below the tag as they are.
    fn multiline(&self, lines: Vec<&str>) {
        eprintln!("\n{:>width$}", self.tag(), width = GUTTER);
        for line in lines {
            eprintln!("{}", line);
        }
        eprintln!()
    }

    pub fn log(&self, message: &str) {
        let lines = message.lines().collect::<Vec<&str>>();

        if lines.len() > 1 {
            self.multiline(lines);
        } else {
            eprintln!("{:>width$} {}", self.tag(), message, width = GUTTER);
        }
    }

    /// Logs a message followed by one indented line per item.
    pub fn list<T: std::fmt::Display>(&self, message: &str, items: impl IntoIterator<Item = T>) {
        self.log(message);
        for item in items {
            eprintln!("{:>width$} {}", "-", item, width = GUTTER + 2);
        }
    }
}
