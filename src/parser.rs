//! Turns a line of shell input into an [`Invocation`].
//!
//! Two surface syntaxes are understood:
//! * shell-style, `update User 1234 first_name "Betty"`, and
//! * call-style, `User.update("1234", "first_name", "Betty")`, including the
//!   mapping form `User.update("1234", {"first_name": "Betty"})`.
//!
//! A [`LineParser`] holds an ordered list of grammars. Each one either claims
//! the line, rejects it with a [`Diagnostic`], or passes it on. Shell-style
//! parsing is always last and claims whatever reaches it.

use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use regex::Regex;
use tracing::debug;

use crate::construct::RecordKind;
use crate::error::Diagnostic;

#[derive(Parser)]
#[grammar = "hbnb.pest"]
struct ArgumentParser;

lazy_static! {
    static ref METHOD_CALL: Regex = Regex::new(r"^(\w+)\.(\w+)\((.*)\)$").unwrap();
    static ref MAPPING_UPDATE: Regex =
        Regex::new(r#"^(\w+)\.update\(\s*("[^"]*"|[^,]*?)\s*,\s*(\{.*)\)$"#).unwrap();
}

// ------------- Command -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
    Quit,
    Eof,
    Help,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::Eof,
        Command::All,
        Command::Count,
        Command::Create,
        Command::Destroy,
        Command::Help,
        Command::Quit,
        Command::Show,
        Command::Update,
    ];
    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL.iter().copied().find(|command| command.name() == name)
    }
    pub const fn name(self) -> &'static str {
        match self {
            Command::Create => "create",
            Command::Show => "show",
            Command::Destroy => "destroy",
            Command::All => "all",
            Command::Count => "count",
            Command::Update => "update",
            Command::Quit => "quit",
            Command::Eof => "EOF",
            Command::Help => "help",
        }
    }
    pub const fn summary(self) -> &'static str {
        match self {
            Command::Create => "Creates a new instance of a class, saves it and prints its id.\nUsage: create <class>",
            Command::Show => "Prints an instance.\nUsage: show <class> <id> | <class>.show(<id>)",
            Command::Destroy => "Deletes an instance.\nUsage: destroy <class> <id> | <class>.destroy(<id>)",
            Command::All => "Prints all instances, optionally of one class.\nUsage: all [<class>] | <class>.all()",
            Command::Count => "Prints the number of instances of a class.\nUsage: count <class> | <class>.count()",
            Command::Update => "Sets an attribute of an instance.\nUsage: update <class> <id> <attribute> <value>\n       <class>.update(<id>, <attribute>, <value>)\n       <class>.update(<id>, <dictionary>)",
            Command::Quit => "Quit command to exit the program",
            Command::Eof => "Exits the program at end of input",
            Command::Help => "Lists commands, or describes one.\nUsage: help [<command>]",
        }
    }
}

// ------------- Token -------------
/// One argument as typed. `quoted` records whether it was enclosed in
/// quotes (double, or single in call-style), which are stripped from `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
}

impl Token {
    pub fn bare(text: impl Into<String>) -> Self {
        Self { text: text.into(), quoted: false }
    }
    pub fn quoted(text: impl Into<String>) -> Self {
        Self { text: text.into(), quoted: true }
    }
    /// The text with one layer of enclosing double quotes removed, and
    /// whether there were any.
    pub fn unquoted(&self) -> (&str, bool) {
        if self.quoted {
            return (&self.text, true);
        }
        match self
            .text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(inner) => (inner, true),
            None => (&self.text, false),
        }
    }
}

// ------------- Invocation -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub class_name: Option<String>,
    pub id: Option<String>,
    pub attribute: Option<Token>,
    pub value: Option<Token>,
    /// Attribute/value pairs of the call-style mapping update.
    pub mapping: Option<serde_json::Map<String, serde_json::Value>>,
    /// The argument text as typed.
    pub rest: String,
}

impl Invocation {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            class_name: None,
            id: None,
            attribute: None,
            value: None,
            mapping: None,
            rest: String::new(),
        }
    }
    // positional tokens fill class, id, attribute and value in that order
    fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        let mut tokens = tokens.into_iter();
        self.class_name = tokens.next().map(|t| t.text).filter(|t| !t.is_empty());
        self.id = tokens.next().map(|t| t.text).filter(|t| !t.is_empty());
        self.attribute = tokens.next();
        self.value = tokens.next();
        self
    }
}

// ------------- Parsed -------------
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Empty input.
    Nothing,
    Run(Invocation),
    Reject(Diagnostic),
    /// No grammar understood the line.
    Unknown(String),
}

/// The outcome of parsing one line: what to do, preceded by any notices a
/// grammar printed before passing the line on.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub notices: Vec<Diagnostic>,
    pub action: Action,
}

pub enum Match {
    Claimed(Action),
    Pass,
    PassWith(Diagnostic),
}

pub trait Grammar: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_match(&self, line: &str) -> Match;
}

// ------------- Grammars -------------
/// `Class.method(arguments)` for the methods all, count, show, destroy and
/// update. The mapping form of update is left to [`MappingUpdate`].
pub struct MethodCall;

impl Grammar for MethodCall {
    fn name(&self) -> &'static str {
        "method call"
    }
    fn try_match(&self, line: &str) -> Match {
        let Some(captures) = METHOD_CALL.captures(line) else {
            return Match::Pass;
        };
        let class_name = &captures[1];
        if RecordKind::resolve(class_name).is_none() {
            return Match::Claimed(Action::Reject(Diagnostic::ClassUnknown));
        }
        let command = match &captures[2] {
            "all" => Command::All,
            "count" => Command::Count,
            "show" => Command::Show,
            "destroy" => Command::Destroy,
            "update" if MAPPING_UPDATE.is_match(line) => return Match::Pass,
            "update" => Command::Update,
            _ => return Match::Pass,
        };
        let arguments = &captures[3];
        let mut invocation = Invocation::new(command);
        invocation.rest = arguments.to_string();
        let mut tokens = tokenize_call(arguments).into_iter();
        invocation.class_name = Some(class_name.to_string());
        invocation.id = tokens.next().map(|t| t.text).filter(|t| !t.is_empty());
        if command == Command::Update {
            invocation.attribute = tokens.next();
            invocation.value = tokens.next();
        }
        Match::Claimed(Action::Run(invocation))
    }
}

/// `Class.update("id", {"attribute": value, ...})`. The literal may use
/// single quotes; it has to be a JSON object once they are made double.
pub struct MappingUpdate;

impl Grammar for MappingUpdate {
    fn name(&self) -> &'static str {
        "mapping update"
    }
    fn try_match(&self, line: &str) -> Match {
        let Some(captures) = MAPPING_UPDATE.captures(line) else {
            return Match::Pass;
        };
        let class_name = &captures[1];
        if RecordKind::resolve(class_name).is_none() {
            return Match::Pass;
        }
        let id = Token::bare(captures[2].trim().replace('\'', "\""))
            .unquoted()
            .0
            .to_string();
        let literal = captures[3].trim().replace('\'', "\"");
        match serde_json::from_str::<serde_json::Value>(&literal) {
            Ok(serde_json::Value::Object(mapping)) => {
                let mut invocation = Invocation::new(Command::Update);
                invocation.rest = format!("{}, {}", &captures[2], &captures[3]);
                invocation.class_name = Some(class_name.to_string());
                invocation.id = Some(id).filter(|id| !id.is_empty());
                invocation.mapping = Some(mapping);
                Match::Claimed(Action::Run(invocation))
            }
            Ok(_) => Match::PassWith(Diagnostic::MalformedMapping),
            Err(e) => {
                debug!(error = %e, "malformed mapping literal");
                Match::PassWith(Diagnostic::MalformedMapping)
            }
        }
    }
}

/// `command [class [id [attribute [value]]]]`. Claims every line.
pub struct ShellLine;

impl Grammar for ShellLine {
    fn name(&self) -> &'static str {
        "shell"
    }
    fn try_match(&self, line: &str) -> Match {
        if line.is_empty() {
            return Match::Claimed(Action::Nothing);
        }
        // "?" is shorthand for help
        let (head, rest) = if let Some(rest) = line.strip_prefix('?') {
            ("help", rest)
        } else {
            line.split_once(char::is_whitespace).unwrap_or((line, ""))
        };
        let Some(command) = Command::from_name(head) else {
            return Match::Claimed(Action::Unknown(line.to_string()));
        };
        let mut invocation = Invocation::new(command).with_tokens(tokenize(rest));
        invocation.rest = rest.trim().to_string();
        Match::Claimed(Action::Run(invocation))
    }
}

// ------------- LineParser -------------
pub struct LineParser {
    grammars: Vec<Box<dyn Grammar>>,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            grammars: vec![Box::new(MethodCall), Box::new(MappingUpdate), Box::new(ShellLine)],
        }
    }
    pub fn parse(&self, line: &str) -> Parsed {
        let line = line.trim();
        let mut notices = Vec::new();
        for grammar in &self.grammars {
            match grammar.try_match(line) {
                Match::Claimed(action) => {
                    debug!(grammar = grammar.name(), ?action, "line claimed");
                    return Parsed { notices, action };
                }
                Match::Pass => (),
                Match::PassWith(notice) => notices.push(notice),
            }
        }
        Parsed {
            notices,
            action: Action::Unknown(line.to_string()),
        }
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- Tokenizers -------------
fn token(pair: Pair<Rule>) -> Option<Token> {
    match pair.as_rule() {
        Rule::quoted => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Some(Token::quoted(inner))
        }
        Rule::bare => Some(Token::bare(pair.as_str().trim())),
        Rule::call_bare => Some(call_token(pair.as_str())),
        _ => None,
    }
}

// call-style arguments may also be enclosed in single quotes
fn call_token(text: &str) -> Token {
    let text = text.trim();
    match text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => Token::quoted(inner),
        None => Token::bare(text),
    }
}

fn tokens_of(rule: Rule, text: &str) -> Option<Vec<Token>> {
    match ArgumentParser::parse(rule, text) {
        Ok(mut pairs) => pairs
            .next()
            .map(|arguments| arguments.into_inner().filter_map(token).collect()),
        Err(e) => {
            debug!(?rule, error = %e, "arguments did not parse");
            None
        }
    }
}

/// Splits shell-style arguments on whitespace, keeping quoted text whole.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokens_of(Rule::arguments, text).unwrap_or_default()
}

/// Splits call-style arguments on commas.
pub fn tokenize_call(text: &str) -> Vec<Token> {
    tokens_of(Rule::call_arguments, text).unwrap_or_else(|| {
        text.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(call_token)
            .collect()
    })
}
