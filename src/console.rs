//! The command dispatcher and its read loop.
//!
//! Every command that takes `ClassName [id] [attribute] [value]` validates
//! its arguments in the same order: class given, class known, id given,
//! instance found, then for updates attribute and value given. The first
//! failing check prints its diagnostic and ends the command.

use std::io::{BufRead, Write};

use tracing::{error, warn};

use crate::coercion::{UpdateError, apply_mapping, apply_update};
use crate::construct::{Database, RecordKey, RecordKind};
use crate::error::{Diagnostic, HbnbError, Result};
use crate::parser::{Action, Command, Invocation, LineParser};

pub const PROMPT: &str = "(hbnb) ";

type Checked<T> = std::result::Result<T, Diagnostic>;

/// Whether the session goes on after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Console<W: Write> {
    database: Database,
    parser: LineParser,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(database: Database, out: W) -> Self {
        Self {
            database,
            parser: LineParser::new(),
            out,
        }
    }
    pub fn database(&self) -> &Database {
        &self.database
    }
    pub fn output(&self) -> &W {
        &self.out
    }
    pub fn into_parts(self) -> (Database, W) {
        (self.database, self.out)
    }

    /// Reads and runs lines until `quit` or the end of input.
    pub fn cmdloop<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        loop {
            write!(self.out, "{}", PROMPT)?;
            self.out.flush()?;
            let mut raw = Vec::new();
            let read = input
                .read_until(b'\n', &mut raw)
                .map_err(|e| HbnbError::Input(e.to_string()))?;
            let outcome = if read == 0 {
                self.onecmd(Command::Eof.name())
            } else {
                // bytes that are not UTF-8 become replacement characters
                let line = String::from_utf8_lossy(&raw);
                self.onecmd(line.trim_end_matches(['\n', '\r']))
            };
            match outcome {
                Ok(Control::Continue) => (),
                Ok(Control::Exit) => return Ok(()),
                Err(HbnbError::Output(message)) => return Err(HbnbError::Output(message)),
                Err(e) => {
                    error!(error = %e, "command failed");
                    eprintln!("** {} **", e);
                }
            }
        }
    }

    /// Runs a single line of input.
    pub fn onecmd(&mut self, line: &str) -> Result<Control> {
        let parsed = self.parser.parse(line);
        for notice in parsed.notices {
            self.report(notice)?;
        }
        match parsed.action {
            Action::Nothing => Ok(Control::Continue),
            Action::Reject(diagnostic) => {
                self.report(diagnostic)?;
                Ok(Control::Continue)
            }
            Action::Unknown(line) => {
                warn!(%line, "unknown syntax");
                writeln!(self.out, "*** Unknown syntax: {}", line)?;
                Ok(Control::Continue)
            }
            Action::Run(invocation) => self.dispatch(&invocation),
        }
    }

    fn dispatch(&mut self, invocation: &Invocation) -> Result<Control> {
        match invocation.command {
            Command::Create => self.do_create(invocation)?,
            Command::Show => self.do_show(invocation)?,
            Command::Destroy => self.do_destroy(invocation)?,
            Command::All => self.do_all(invocation)?,
            Command::Count => self.do_count(invocation)?,
            Command::Update => self.do_update(invocation)?,
            Command::Help => self.do_help(invocation)?,
            Command::Quit => return Ok(Control::Exit),
            Command::Eof => {
                writeln!(self.out)?;
                return Ok(Control::Exit);
            }
        }
        Ok(Control::Continue)
    }

    fn report(&mut self, diagnostic: Diagnostic) -> Result<()> {
        writeln!(self.out, "{}", diagnostic)?;
        Ok(())
    }

    // ------------- validation -------------
    fn require_kind(invocation: &Invocation) -> Checked<RecordKind> {
        let class_name = invocation
            .class_name
            .as_deref()
            .ok_or(Diagnostic::ClassNameMissing)?;
        RecordKind::resolve(class_name).ok_or(Diagnostic::ClassUnknown)
    }
    fn require_key(&self, invocation: &Invocation) -> Checked<RecordKey> {
        let kind = Self::require_kind(invocation)?;
        let id = invocation.id.as_deref().ok_or(Diagnostic::InstanceIdMissing)?;
        let key = RecordKey::new(kind, id);
        if self.database.contains(&key) {
            Ok(key)
        } else {
            Err(Diagnostic::NoInstanceFound)
        }
    }

    // ------------- commands -------------
    fn do_create(&mut self, invocation: &Invocation) -> Result<()> {
        let kind = match Self::require_kind(invocation) {
            Ok(kind) => kind,
            Err(diagnostic) => return self.report(diagnostic),
        };
        let key = self.database.create(kind)?;
        writeln!(self.out, "{}", key.id())?;
        Ok(())
    }

    fn do_show(&mut self, invocation: &Invocation) -> Result<()> {
        let key = match self.require_key(invocation) {
            Ok(key) => key,
            Err(diagnostic) => return self.report(diagnostic),
        };
        if let Some(record) = self.database.get(&key) {
            writeln!(self.out, "{}", record)?;
        }
        Ok(())
    }

    fn do_destroy(&mut self, invocation: &Invocation) -> Result<()> {
        let key = match self.require_key(invocation) {
            Ok(key) => key,
            Err(diagnostic) => return self.report(diagnostic),
        };
        self.database.destroy(&key)?;
        Ok(())
    }

    fn do_all(&mut self, invocation: &Invocation) -> Result<()> {
        let kind = match invocation.class_name {
            None => None,
            Some(_) => match Self::require_kind(invocation) {
                Ok(kind) => Some(kind),
                Err(diagnostic) => return self.report(diagnostic),
            },
        };
        for record in self.database.all() {
            if kind.is_none_or(|kind| record.kind() == kind) {
                writeln!(self.out, "{}", record)?;
            }
        }
        Ok(())
    }

    fn do_count(&mut self, invocation: &Invocation) -> Result<()> {
        let kind = match Self::require_kind(invocation) {
            Ok(kind) => kind,
            Err(diagnostic) => return self.report(diagnostic),
        };
        writeln!(self.out, "{}", self.database.count(kind))?;
        Ok(())
    }

    fn do_update(&mut self, invocation: &Invocation) -> Result<()> {
        let key = match self.require_key(invocation) {
            Ok(key) => key,
            Err(diagnostic) => return self.report(diagnostic),
        };
        let updated = match &invocation.mapping {
            Some(mapping) => apply_mapping(&mut self.database, &key, mapping).map(|_| ()),
            None => apply_update(
                &mut self.database,
                &key,
                invocation.attribute.as_ref(),
                invocation.value.as_ref(),
            )
            .map(|_| ()),
        };
        match updated {
            Ok(()) => Ok(()),
            Err(UpdateError::Rejected(diagnostic)) => self.report(diagnostic),
            Err(UpdateError::Persistence(e)) => Err(e),
        }
    }

    fn do_help(&mut self, invocation: &Invocation) -> Result<()> {
        let topic = invocation.rest.trim();
        if topic.is_empty() {
            let names: Vec<&str> = Command::ALL.iter().map(|command| command.name()).collect();
            let heading = "Documented commands (type help <topic>):";
            writeln!(self.out)?;
            writeln!(self.out, "{}", heading)?;
            writeln!(self.out, "{}", "=".repeat(heading.len()))?;
            writeln!(self.out, "{}", names.join("  "))?;
            writeln!(self.out)?;
        } else {
            match Command::from_name(topic) {
                Some(command) => writeln!(self.out, "{}", command.summary())?,
                None => writeln!(self.out, "*** No help on {}", topic)?,
            }
        }
        Ok(())
    }
}
